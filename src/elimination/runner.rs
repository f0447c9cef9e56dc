//! Bucket elimination over a caller-supplied order.
//!
//! [`EliminationRunner`] drives the full algorithm:
//! partition constraints into buckets → compute buckets in order, forwarding
//! each h-function → back-substitute an optimal assignment.

use super::types::{EliminationResult, Problem};
use crate::bucket::{Bucket, BucketConfig, HFunction, Row};
use crate::error::{BucketError, Result};
use crate::model::{Utility, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Executes bucket elimination.
///
/// The order is an input: `order[0]` is eliminated first. Choosing a good
/// order (min-degree, min-fill, ...) is left to the caller.
///
/// # Usage
///
/// ```
/// use u_bucket::bucket::BucketConfig;
/// use u_bucket::elimination::{EliminationRunner, Problem};
/// use u_bucket::model::{Domains, InequalityConstraint, SoftConstraint};
///
/// let problem = Problem::new(Domains::new().with("X", [0, 1]).with("Y", [0, 1]))
///     .with_soft(SoftConstraint::from_fn(["X", "Y"], |v| (v[0] + 2 * v[1]) as f64))
///     .with_hard(InequalityConstraint::new(["X", "Y"]).unwrap());
///
/// let order = vec!["Y".to_string(), "X".to_string()];
/// let result = EliminationRunner::run(&problem, &order, &BucketConfig::default()).unwrap();
/// assert_eq!(result.objective, 2.0);
/// assert_eq!(result.assignment["Y"], 1);
/// ```
pub struct EliminationRunner;

impl EliminationRunner {
    /// Runs bucket elimination and recovers an optimal assignment.
    ///
    /// # Errors
    ///
    /// - [`BucketError::Infeasible`] when the problem has no solution.
    /// - [`BucketError::InvalidOrder`] / [`BucketError::MissingDomain`] for a
    ///   malformed order, plus any configuration error of a bucket.
    pub fn run(problem: &Problem, order: &[String], config: &BucketConfig) -> Result<EliminationResult> {
        config.validate()?;
        let position = validate_order(problem, order)?;

        info!(
            event = "elimination_start",
            variables = order.len(),
            soft = problem.soft.len(),
            hard = problem.hard.len(),
        );

        // Each constraint lives in the bucket of its earliest-eliminated variable.
        let mut buckets: Vec<Bucket> = order.iter().map(Bucket::new).collect();
        for c in &problem.soft {
            if let Some(k) = earliest(&position, c.params().iter().map(String::as_str)) {
                buckets[k].add_soft(c.clone());
            }
        }
        for c in &problem.hard {
            if let Some(k) = earliest(&position, c.variables()) {
                buckets[k].add_hard(c.clone());
            }
        }

        let mut pending: Vec<Vec<HFunction>> = vec![Vec::new(); order.len()];
        let mut objective = 0.0;
        for k in 0..order.len() {
            let inherited = std::mem::take(&mut pending[k]);
            let out = buckets[k].compute(&problem.domains, &inherited, config)?;
            let h = out.h_function.clone();
            let candidates = out.table.enumerated();

            match earliest(&position, h.variables().iter().map(String::as_str)) {
                Some(target) => pending[target].push(h),
                None => match h.get(&[]) {
                    Some(Utility::Feasible(v)) => objective += v,
                    _ => return Err(BucketError::Infeasible { candidates }),
                },
            }
        }

        let assignment = back_substitute(problem, order, &buckets)?;

        info!(event = "elimination_end", objective = objective);

        Ok(EliminationResult {
            objective,
            assignment,
            buckets,
        })
    }
}

/// Checks the order and maps each variable to its position.
fn validate_order<'a>(problem: &Problem, order: &'a [String]) -> Result<HashMap<&'a str, usize>> {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (k, v) in order.iter().enumerate() {
        problem.domains.values(v)?;
        if position.insert(v.as_str(), k).is_some() {
            return Err(BucketError::InvalidOrder(format!(
                "variable `{v}` appears more than once"
            )));
        }
    }

    let constrained = problem
        .soft
        .iter()
        .flat_map(|c| c.params().iter().map(String::as_str))
        .chain(problem.hard.iter().flat_map(|c| c.variables()));
    for v in constrained {
        if !position.contains_key(v) {
            return Err(BucketError::InvalidOrder(format!(
                "constrained variable `{v}` is missing from the order"
            )));
        }
    }
    Ok(position)
}

/// Position of the earliest-eliminated variable among `variables`.
fn earliest<'v>(
    position: &HashMap<&str, usize>,
    variables: impl Iterator<Item = &'v str>,
) -> Option<usize> {
    variables.filter_map(|v| position.get(v).copied()).min()
}

/// Assigns variables in reverse elimination order, taking in each bucket
/// the first row of maximal objective consistent with earlier choices.
fn back_substitute(
    problem: &Problem,
    order: &[String],
    buckets: &[Bucket],
) -> Result<BTreeMap<String, Value>> {
    let mut assignment: BTreeMap<String, Value> = BTreeMap::new();

    for (variable, bucket) in order.iter().zip(buckets).rev() {
        let table = bucket.table().ok_or_else(|| {
            BucketError::InvalidOrder(format!("bucket `{variable}` was not computed"))
        })?;
        let scope = table.schema().scope();

        let value = match table.schema().position(variable) {
            // Unconstrained: any value is optimal.
            None => problem
                .domains
                .values(variable)?
                .first()
                .copied()
                .ok_or(BucketError::Infeasible { candidates: 0 })?,
            Some(p) => {
                let mut best: Option<&Row> = None;
                for row in table.rows() {
                    let consistent = scope.iter().zip(row.assignment()).all(|(v, value)| {
                        v == variable || assignment.get(v).map_or(true, |a| a == value)
                    });
                    if consistent && best.map_or(true, |b| row.sum() > b.sum()) {
                        best = Some(row);
                    }
                }
                best.ok_or(BucketError::Infeasible {
                    candidates: table.enumerated(),
                })?
                .assignment()[p]
            }
        };
        assignment.insert(variable.clone(), value);
    }
    Ok(assignment)
}
