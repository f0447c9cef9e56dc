//! Joint table construction.
//!
//! [`TableBuilder`] enumerates the Cartesian product of the scope domains,
//! evaluates every soft constraint and inherited h-function per row, drops
//! rows that violate a hard constraint or carry an infeasible contribution,
//! and sums the remaining contributions into the row objective.

use super::config::BucketConfig;
use super::types::{HFunction, Row, Table, TableSchema};
use crate::error::{BucketError, Result};
use crate::model::constraint::coincide;
use crate::model::{Domains, InequalityConstraint, SoftConstraint, Utility, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builds bucket tables.
pub struct TableBuilder;

impl TableBuilder {
    /// Sorted, deduplicated union of every variable mentioned by the
    /// constraints and inherited h-functions.
    pub fn scope(
        soft: &[SoftConstraint],
        hard: &[InequalityConstraint],
        inherited: &[HFunction],
    ) -> Vec<String> {
        let mut scope: BTreeSet<&str> = BTreeSet::new();
        for c in soft {
            scope.extend(c.params().iter().map(String::as_str));
        }
        for c in hard {
            scope.extend(c.variables());
        }
        for h in inherited {
            scope.extend(h.variables().iter().map(String::as_str));
        }
        scope.into_iter().map(str::to_string).collect()
    }

    /// Builds the filtered table over `scope`.
    ///
    /// `scope` must be sorted and free of duplicates, as returned by
    /// [`TableBuilder::scope`].
    ///
    /// # Errors
    ///
    /// - [`BucketError::Infeasible`] when no row survives filtering.
    /// - [`BucketError::InvalidConfig`] when `scope` is unsorted or repeats a
    ///   variable.
    /// - [`BucketError::MissingDomain`], [`BucketError::ArityMismatch`],
    ///   [`BucketError::UndefinedCost`], [`BucketError::ScopeMismatch`] for
    ///   malformed inputs.
    /// - [`BucketError::TableTooLarge`] when the product exceeds the row limit.
    pub fn build(
        scope: &[String],
        domains: &Domains,
        soft: &[SoftConstraint],
        inherited: &[HFunction],
        hard: &[InequalityConstraint],
        config: &BucketConfig,
    ) -> Result<Table> {
        config.validate()?;
        if let Some(pair) = scope.windows(2).find(|w| w[0] >= w[1]) {
            return Err(BucketError::InvalidConfig(format!(
                "scope must be strictly increasing, found `{}` before `{}`",
                pair[0], pair[1]
            )));
        }
        let schema = TableSchema::new(scope.to_vec(), soft.len(), inherited.len());

        let axes: Vec<&[Value]> = scope
            .iter()
            .map(|v| domains.values(v))
            .collect::<Result<_>>()?;

        let soft_plans: Vec<SoftPlan<'_>> = soft
            .iter()
            .enumerate()
            .map(|(i, c)| SoftPlan::resolve(i, c, &schema, domains))
            .collect::<Result<_>>()?;

        let lookups: Vec<HLookup> = inherited
            .iter()
            .map(|h| HLookup::resolve(h, &schema, domains))
            .collect::<Result<_>>()?;

        // Constraint variables outside the scope count as unassigned.
        let hard_plans: Vec<Vec<usize>> = hard
            .iter()
            .map(|c| c.variables().filter_map(|v| schema.position(v)).collect())
            .collect();

        let limit = config.max_rows.unwrap_or(usize::MAX);
        let total = product_len(&axes)
            .filter(|&n| n <= limit)
            .ok_or(BucketError::TableTooLarge { limit })?;

        let evaluate = |index: usize| -> Result<Option<Row>> {
            let assignment = decode(index, &axes);

            if hard_plans
                .iter()
                .any(|positions| coincide(positions.iter().map(|&p| assignment[p])))
            {
                return Ok(None);
            }

            let mut derived = Vec::with_capacity(soft_plans.len() + lookups.len());
            for plan in &soft_plans {
                derived.push(plan.evaluate(&assignment)?);
            }
            for lookup in &lookups {
                derived.push(lookup.get(&assignment));
            }

            let Utility::Feasible(sum) = derived.iter().copied().sum::<Utility>() else {
                return Ok(None);
            };
            Ok(Some(Row::new(assignment, derived, sum)))
        };

        let rows: Vec<Row> = evaluate_all(total, config.use_parallel(total), evaluate)?
            .into_iter()
            .flatten()
            .collect();

        trace!(
            event = "table_filtered",
            scope = ?scope,
            enumerated = total,
            surviving = rows.len(),
        );

        if rows.is_empty() {
            return Err(BucketError::Infeasible { candidates: total });
        }
        Ok(Table::new(schema, rows, total))
    }
}

/// Runs `f` over `0..total`, keeping index order in the output.
fn evaluate_all<F>(total: usize, parallel: bool, f: F) -> Result<Vec<Option<Row>>>
where
    F: Fn(usize) -> Result<Option<Row>> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return (0..total).into_par_iter().map(f).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..total).map(f).collect()
}

/// Size of the Cartesian product over `axes`, or `None` on overflow.
pub(crate) fn product_len(axes: &[&[Value]]) -> Option<usize> {
    axes.iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
}

/// The `index`-th combination of the product; the last axis varies fastest.
pub(crate) fn decode(mut index: usize, axes: &[&[Value]]) -> Vec<Value> {
    let mut values = vec![0; axes.len()];
    for (slot, axis) in values.iter_mut().zip(axes.iter()).rev() {
        *slot = axis[index % axis.len()];
        index /= axis.len();
    }
    values
}

/// A soft constraint with its arguments resolved to column positions.
struct SoftPlan<'a> {
    index: usize,
    constraint: &'a SoftConstraint,
    positions: Vec<usize>,
}

impl<'a> SoftPlan<'a> {
    fn resolve(
        index: usize,
        constraint: &'a SoftConstraint,
        schema: &TableSchema,
        domains: &Domains,
    ) -> Result<Self> {
        if constraint.arity() != constraint.params().len() {
            return Err(BucketError::ArityMismatch {
                constraint: index,
                expected: constraint.arity(),
                actual: constraint.params().len(),
            });
        }
        let positions = constraint
            .params()
            .iter()
            .map(|v| {
                domains.values(v)?;
                schema.position(v).ok_or_else(|| BucketError::ScopeMismatch {
                    variable: v.clone(),
                })
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            index,
            constraint,
            positions,
        })
    }

    fn evaluate(&self, assignment: &[Value]) -> Result<Utility> {
        let args: Vec<Value> = self.positions.iter().map(|&p| assignment[p]).collect();
        let value = self.constraint.evaluate(&args);
        if value.is_nan() {
            return Err(BucketError::UndefinedCost {
                constraint: self.index,
            });
        }
        Ok(Utility::from(value))
    }
}

/// An inherited h-function indexed by its key-variable tuple.
struct HLookup {
    positions: Vec<usize>,
    entries: HashMap<Vec<Value>, Utility>,
}

impl HLookup {
    fn resolve(h: &HFunction, schema: &TableSchema, domains: &Domains) -> Result<Self> {
        let positions = h
            .variables()
            .iter()
            .map(|v| {
                domains.values(v)?;
                schema.position(v).ok_or_else(|| BucketError::ScopeMismatch {
                    variable: v.clone(),
                })
            })
            .collect::<Result<_>>()?;
        // Later rows win on duplicate keys.
        let entries = h
            .rows()
            .iter()
            .map(|r| (r.values.clone(), r.max))
            .collect();
        Ok(Self { positions, entries })
    }

    /// A row with no matching entry has no valid contribution.
    fn get(&self, assignment: &[Value]) -> Utility {
        let key: Vec<Value> = self.positions.iter().map(|&p| assignment[p]).collect();
        self.entries.get(&key).copied().unwrap_or(Utility::Infeasible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Field, HRow};

    fn xy_domains() -> Domains {
        Domains::new().with("X", [0, 1]).with("Y", [0, 1])
    }

    fn names(vars: &[&str]) -> Vec<String> {
        vars.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_scope_is_sorted_union() {
        let soft = vec![SoftConstraint::from_fn(["Z", "A"], |_| 0.0)];
        let hard = vec![InequalityConstraint::new(["B", "A"]).unwrap()];
        let h = HFunction::new(names(&["C"]), vec![]).unwrap();
        assert_eq!(
            TableBuilder::scope(&soft, &hard, &[h]),
            names(&["A", "B", "C", "Z"])
        );
    }

    #[test]
    fn test_decode_order_matches_product() {
        let a: &[Value] = &[0, 1];
        let b: &[Value] = &[5, 6, 7];
        let axes = [a, b];
        assert_eq!(product_len(&axes), Some(6));
        let all: Vec<Vec<Value>> = (0..6).map(|i| decode(i, &axes)).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 5],
                vec![0, 6],
                vec![0, 7],
                vec![1, 5],
                vec![1, 6],
                vec![1, 7]
            ]
        );
    }

    #[test]
    fn test_empty_scope_has_one_row() {
        let table =
            TableBuilder::build(&[], &Domains::new(), &[], &[], &[], &BucketConfig::default())
                .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].sum(), 0.0);
    }

    #[test]
    fn test_worked_scenario_table() {
        let soft = vec![SoftConstraint::from_fn(["X", "Y"], |v| (v[0] + v[1]) as f64)];
        let hard = vec![InequalityConstraint::new(["X", "Y"]).unwrap()];
        let scope = TableBuilder::scope(&soft, &hard, &[]);
        let table = TableBuilder::build(
            &scope,
            &xy_domains(),
            &soft,
            &[],
            &hard,
            &BucketConfig::default(),
        )
        .unwrap();

        assert_eq!(table.enumerated(), 4);
        assert_eq!(table.len(), 2);
        let rows: Vec<(&[Value], f64)> =
            table.rows().iter().map(|r| (r.assignment(), r.sum())).collect();
        assert_eq!(rows, vec![(&[0, 1][..], 1.0), (&[1, 0][..], 1.0)]);
        assert_eq!(
            table.field_of(&table.rows()[0], Field::Soft(0)),
            Some(Utility::Feasible(1.0))
        );
    }

    #[test]
    fn test_single_value_domain_is_infeasible() {
        let domains = Domains::new().with("X", [0]).with("Y", [0]);
        let hard = vec![InequalityConstraint::new(["X", "Y"]).unwrap()];
        let err = TableBuilder::build(
            &names(&["X", "Y"]),
            &domains,
            &[],
            &[],
            &hard,
            &BucketConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, BucketError::Infeasible { candidates: 1 });
    }

    #[test]
    fn test_missing_domain_is_configuration_error() {
        let soft = vec![SoftConstraint::from_fn(["X", "W"], |_| 0.0)];
        let err = TableBuilder::build(
            &names(&["W", "X"]),
            &xy_domains(),
            &soft,
            &[],
            &[],
            &BucketConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BucketError::MissingDomain {
                variable: "W".into()
            }
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_arity_mismatch_names_constraint() {
        use crate::model::FnCost;
        let soft = vec![
            SoftConstraint::from_fn(["X"], |v| v[0] as f64),
            SoftConstraint::new(FnCost::new(1, |v: &[Value]| v[0] as f64), ["X", "Y"]),
        ];
        let err = TableBuilder::build(
            &names(&["X", "Y"]),
            &xy_domains(),
            &soft,
            &[],
            &[],
            &BucketConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BucketError::ArityMismatch {
                constraint: 1,
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_nan_cost_is_rejected() {
        let soft = vec![SoftConstraint::from_fn(["X"], |_| f64::NAN)];
        let err = TableBuilder::build(
            &names(&["X"]),
            &xy_domains(),
            &soft,
            &[],
            &[],
            &BucketConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, BucketError::UndefinedCost { constraint: 0 });
    }

    #[test]
    fn test_soft_veto_drops_row() {
        let soft = vec![SoftConstraint::from_fn(["X"], |v| {
            if v[0] == 0 {
                f64::NEG_INFINITY
            } else {
                2.0
            }
        })];
        let table = TableBuilder::build(
            &names(&["X"]),
            &xy_domains(),
            &soft,
            &[],
            &[],
            &BucketConfig::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].assignment(), &[1]);
    }

    #[test]
    fn test_inherited_lookup_and_infeasible_rows() {
        let h = HFunction::new(
            names(&["Y"]),
            vec![
                HRow {
                    values: vec![0],
                    max: Utility::Infeasible,
                },
                HRow {
                    values: vec![1],
                    max: Utility::Feasible(3.0),
                },
            ],
        )
        .unwrap();
        let soft = vec![SoftConstraint::from_fn(["X"], |v| v[0] as f64)];
        let inherited = vec![h];
        let scope = TableBuilder::scope(&soft, &[], &inherited);
        let table = TableBuilder::build(
            &scope,
            &xy_domains(),
            &soft,
            &inherited,
            &[],
            &BucketConfig::default(),
        )
        .unwrap();

        assert_eq!(table.enumerated(), 4);
        assert_eq!(table.len(), 2);
        for row in table.rows() {
            assert_eq!(table.value_of(row, "Y"), Some(1));
            assert_eq!(table.field_of(row, Field::Inherited(0)), Some(Utility::Feasible(3.0)));
        }
        let sums: Vec<f64> = table.rows().iter().map(Row::sum).collect();
        assert_eq!(sums, vec![3.0, 4.0]);
    }

    #[test]
    fn test_lookup_gap_is_infeasible() {
        let h = HFunction::new(
            names(&["X"]),
            vec![HRow {
                values: vec![1],
                max: Utility::Feasible(0.0),
            }],
        )
        .unwrap();
        let table = TableBuilder::build(
            &names(&["X"]),
            &xy_domains(),
            &[],
            &[h],
            &[],
            &BucketConfig::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].assignment(), &[1]);
    }

    #[test]
    fn test_h_variable_outside_scope() {
        let h = HFunction::constant(Utility::Feasible(1.0));
        let h2 = HFunction::new(names(&["Y"]), vec![]).unwrap();
        let err = TableBuilder::build(
            &names(&["X"]),
            &xy_domains(),
            &[],
            &[h, h2],
            &[],
            &BucketConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BucketError::ScopeMismatch {
                variable: "Y".into()
            }
        );
    }

    #[test]
    fn test_malformed_scope_is_rejected() {
        let soft = vec![SoftConstraint::from_fn(["X"], |v| v[0] as f64)];
        let hard = vec![InequalityConstraint::new(["X", "Y"]).unwrap()];
        for scope in [names(&["Y", "X", "X"]), names(&["X", "X", "Y"]), names(&["Y", "X"])] {
            let err = TableBuilder::build(
                &scope,
                &xy_domains(),
                &soft,
                &[],
                &hard,
                &BucketConfig::default(),
            )
            .unwrap_err();
            assert!(matches!(err, BucketError::InvalidConfig(_)), "{scope:?}");
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_partial_hard_constraint_in_scope() {
        // Z is outside the scope: only X and Y are compared
        let domains = xy_domains().with("Z", [0, 1]);
        let hard = vec![InequalityConstraint::new(["X", "Y", "Z"]).unwrap()];
        let table = TableBuilder::build(
            &names(&["X", "Y"]),
            &domains,
            &[],
            &[],
            &hard,
            &BucketConfig::default(),
        )
        .unwrap();
        let rows: Vec<&[Value]> = table.rows().iter().map(Row::assignment).collect();
        assert_eq!(rows, vec![&[0, 1][..], &[1, 0][..]]);

        // a single present variable never violates the constraint
        let table = TableBuilder::build(
            &names(&["X"]),
            &domains,
            &[],
            &[],
            &hard,
            &BucketConfig::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);

        // over the full scope only all-equal rows are dropped
        let table = TableBuilder::build(
            &names(&["X", "Y", "Z"]),
            &domains,
            &[],
            &[],
            &hard,
            &BucketConfig::default(),
        )
        .unwrap();
        assert_eq!(table.enumerated(), 8);
        assert_eq!(table.len(), 6);
        assert!(table
            .rows()
            .iter()
            .all(|r| r.assignment() != &[0, 0, 0][..] && r.assignment() != &[1, 1, 1][..]));
    }

    #[test]
    fn test_row_limit() {
        let config = BucketConfig::default().with_max_rows(3);
        let err = TableBuilder::build(&names(&["X", "Y"]), &xy_domains(), &[], &[], &[], &config)
            .unwrap_err();
        assert_eq!(err, BucketError::TableTooLarge { limit: 3 });
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let domains = Domains::new()
            .with("A", 0..6)
            .with("B", 0..5)
            .with("C", 0..4);
        let soft = vec![
            SoftConstraint::from_fn(["A", "B"], |v| (v[0] * v[1]) as f64),
            SoftConstraint::from_fn(["C", "A"], |v| (v[0] - v[1]) as f64),
        ];
        let hard = vec![InequalityConstraint::new(["A", "C"]).unwrap()];
        let scope = TableBuilder::scope(&soft, &hard, &[]);

        let seq = TableBuilder::build(&scope, &domains, &soft, &[], &hard, &BucketConfig::sequential())
            .unwrap();
        let par = TableBuilder::build(
            &scope,
            &domains,
            &soft,
            &[],
            &hard,
            &BucketConfig::default().with_parallel_threshold(1),
        )
        .unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.enumerated(), 120);
    }
}
