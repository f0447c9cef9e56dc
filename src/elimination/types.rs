//! Problem definition and elimination result.

use crate::bucket::Bucket;
use crate::model::{Domains, InequalityConstraint, SoftConstraint, Value};
use std::collections::BTreeMap;

/// A complete constraint-optimization problem: maximize the sum of the soft
/// constraints subject to the hard constraints.
///
/// # Examples
///
/// ```
/// use u_bucket::elimination::Problem;
/// use u_bucket::model::{Domains, InequalityConstraint, SoftConstraint};
/// use std::collections::BTreeMap;
///
/// let problem = Problem::new(Domains::new().with("X", [0, 1]).with("Y", [0, 1]))
///     .with_soft(SoftConstraint::from_fn(["X", "Y"], |v| (v[0] + v[1]) as f64))
///     .with_hard(InequalityConstraint::new(["X", "Y"]).unwrap());
/// let assignment = BTreeMap::from([("X".to_string(), 1), ("Y".to_string(), 0)]);
/// assert_eq!(problem.evaluate(&assignment), Some(1.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// Variable domains.
    pub domains: Domains,
    /// Soft constraints.
    pub soft: Vec<SoftConstraint>,
    /// Hard constraints.
    pub hard: Vec<InequalityConstraint>,
}

impl Problem {
    /// Creates a problem with no constraints.
    pub fn new(domains: Domains) -> Self {
        Self {
            domains,
            soft: Vec::new(),
            hard: Vec::new(),
        }
    }

    /// Adds a soft constraint.
    pub fn with_soft(mut self, constraint: SoftConstraint) -> Self {
        self.soft.push(constraint);
        self
    }

    /// Adds a hard constraint.
    pub fn with_hard(mut self, constraint: InequalityConstraint) -> Self {
        self.hard.push(constraint);
        self
    }

    /// Adds several hard constraints.
    pub fn with_hard_all(mut self, constraints: impl IntoIterator<Item = InequalityConstraint>) -> Self {
        self.hard.extend(constraints);
        self
    }

    /// Objective of a full assignment, or `None` if it is infeasible or
    /// leaves a constrained variable unassigned.
    pub fn evaluate(&self, assignment: &BTreeMap<String, Value>) -> Option<f64> {
        for c in &self.hard {
            if c.variables().any(|v| !assignment.contains_key(v)) {
                return None;
            }
            if c.is_violated_by(|v| assignment.get(v).copied()) {
                return None;
            }
        }
        let mut total = 0.0;
        for c in &self.soft {
            let args: Option<Vec<Value>> =
                c.params().iter().map(|v| assignment.get(v).copied()).collect();
            let value = c.evaluate(&args?);
            if value == f64::NEG_INFINITY || value.is_nan() {
                return None;
            }
            total += value;
        }
        Some(total)
    }
}

/// Result of a full elimination run.
#[derive(Debug, Clone)]
pub struct EliminationResult {
    /// Optimal objective value.
    pub objective: f64,
    /// An optimal assignment of every variable in the order.
    pub assignment: BTreeMap<String, Value>,
    /// Computed buckets, in elimination order.
    pub buckets: Vec<Bucket>,
}
