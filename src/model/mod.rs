//! Problem modeling layer.
//!
//! Describes a discrete constraint-optimization problem the way the bucket
//! computations consume it:
//!
//! - **Domains**: [`Domains`] maps each variable to an ordered, finite set of
//!   [`Value`]s.
//! - **Soft constraints**: [`SoftConstraint`] pairs a [`CostFunction`] with the
//!   ordered list of variables it is applied to. Contributions are summed
//!   into the objective, which is maximized.
//! - **Hard constraints**: [`InequalityConstraint`] excludes assignments in
//!   which all listed variables take the same value.
//! - **Utilities**: [`Utility`] carries either a feasible objective
//!   contribution or the explicit `Infeasible` marker.
//!
//! # References
//!
//! Dechter (1999), "Bucket elimination: A unifying framework for reasoning"

pub(crate) mod constraint;
mod domain;
mod utility;

pub use constraint::{CostFunction, FnCost, InequalityConstraint, SoftConstraint, TableCost};
pub use domain::{Domains, Value};
pub use utility::Utility;
