//! Per-variable bucket with a one-shot computation.

use super::builder::TableBuilder;
use super::config::BucketConfig;
use super::extractor::HFunctionExtractor;
use super::types::{HFunction, Table};
use crate::error::{BucketError, Result};
use crate::model::{Domains, InequalityConstraint, SoftConstraint};
use tracing::debug;

/// Output of a computed bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketTables {
    /// Sorted scope of the table.
    pub scope: Vec<String>,
    /// Filtered joint table.
    pub table: Table,
    /// Outgoing h-function (scope minus the bucket variable).
    pub h_function: HFunction,
}

/// The container of one variable's constraints during elimination.
///
/// A bucket is either *constructed* or *computed*. [`Bucket::compute`]
/// moves it from the first state to the second exactly once; recomputing
/// requires a new bucket.
///
/// # Examples
///
/// ```
/// use u_bucket::bucket::{Bucket, BucketConfig};
/// use u_bucket::model::{Domains, InequalityConstraint, SoftConstraint};
///
/// let domains = Domains::new().with("X", [0, 1]).with("Y", [0, 1]);
/// let mut bucket = Bucket::new("Y")
///     .with_soft(SoftConstraint::from_fn(["X", "Y"], |v| (v[0] + v[1]) as f64))
///     .with_hard(InequalityConstraint::new(["X", "Y"]).unwrap());
///
/// let out = bucket.compute(&domains, &[], &BucketConfig::default()).unwrap();
/// assert_eq!(out.table.len(), 2);
/// assert_eq!(out.h_function.len(), 2);
/// assert!(bucket.is_computed());
/// ```
#[derive(Debug, Clone)]
pub struct Bucket {
    variable: String,
    soft: Vec<SoftConstraint>,
    hard: Vec<InequalityConstraint>,
    computed: Option<BucketTables>,
}

impl Bucket {
    /// Creates an empty bucket for `variable`.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            soft: Vec::new(),
            hard: Vec::new(),
            computed: None,
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

    /// Adds a soft constraint in place.
    pub fn add_soft(&mut self, constraint: SoftConstraint) {
        self.soft.push(constraint);
    }

    /// Adds a hard constraint in place.
    pub fn add_hard(&mut self, constraint: InequalityConstraint) {
        self.hard.push(constraint);
    }

    /// The variable this bucket eliminates.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Soft constraints placed in this bucket.
    pub fn soft_constraints(&self) -> &[SoftConstraint] {
        &self.soft
    }

    /// Hard constraints placed in this bucket.
    pub fn hard_constraints(&self) -> &[InequalityConstraint] {
        &self.hard
    }

    /// Whether [`Bucket::compute`] has succeeded.
    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Scope the bucket would have with the given inherited h-functions.
    pub fn scope(&self, inherited: &[HFunction]) -> Vec<String> {
        TableBuilder::scope(&self.soft, &self.hard, inherited)
    }

    /// Builds the table and extracts the outgoing h-function.
    ///
    /// # Errors
    ///
    /// - [`BucketError::AlreadyComputed`] on a second call.
    /// - Any error of [`TableBuilder::build`]; the bucket stays in the
    ///   constructed state.
    pub fn compute(
        &mut self,
        domains: &Domains,
        inherited: &[HFunction],
        config: &BucketConfig,
    ) -> Result<&BucketTables> {
        if self.computed.is_some() {
            return Err(BucketError::AlreadyComputed {
                variable: self.variable.clone(),
            });
        }

        let scope = self.scope(inherited);
        let table = TableBuilder::build(&scope, domains, &self.soft, inherited, &self.hard, config)?;
        let h_function = HFunctionExtractor::extract(&table, &self.variable, domains)?;

        debug!(
            event = "bucket_computed",
            variable = %self.variable,
            scope_size = scope.len(),
            enumerated = table.enumerated(),
            surviving = table.len(),
            h_rows = h_function.len(),
        );

        Ok(&*self.computed.insert(BucketTables {
            scope,
            table,
            h_function,
        }))
    }

    /// Computed output, if any.
    pub fn tables(&self) -> Option<&BucketTables> {
        self.computed.as_ref()
    }

    /// Computed table, if any.
    pub fn table(&self) -> Option<&Table> {
        self.computed.as_ref().map(|c| &c.table)
    }

    /// Computed h-function, if any.
    pub fn h_function(&self) -> Option<&HFunction> {
        self.computed.as_ref().map(|c| &c.h_function)
    }
}
