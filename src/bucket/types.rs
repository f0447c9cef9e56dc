//! Table and h-function data types.

use crate::error::{BucketError, Result};
use crate::model::{Utility, Value};
use std::collections::BTreeSet;
use std::fmt;

/// A derived column of a bucket table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    /// Value of the i-th soft constraint (`F_i`).
    Soft(usize),
    /// Value looked up in the j-th inherited h-function (`h_j`).
    Inherited(usize),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Soft(i) => write!(f, "F_{i}"),
            Field::Inherited(j) => write!(f, "h_{j}"),
        }
    }
}

/// Column layout of a bucket table, fixed once per bucket.
///
/// Scope variables come first (sorted), then one derived column per soft
/// constraint, then one per inherited h-function.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSchema {
    scope: Vec<String>,
    soft: usize,
    inherited: usize,
}

impl TableSchema {
    /// Creates a schema over `scope` with `soft` + `inherited` derived columns.
    pub fn new(scope: Vec<String>, soft: usize, inherited: usize) -> Self {
        Self {
            scope,
            soft,
            inherited,
        }
    }

    /// Scope variables in enumeration order.
    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    /// Column index of a scope variable.
    pub fn position(&self, variable: &str) -> Option<usize> {
        self.scope.iter().position(|v| v == variable)
    }

    /// Number of derived columns.
    pub fn derived_len(&self) -> usize {
        self.soft + self.inherited
    }

    /// Derived columns in storage order.
    pub fn derived(&self) -> impl Iterator<Item = Field> + '_ {
        (0..self.soft)
            .map(Field::Soft)
            .chain((0..self.inherited).map(Field::Inherited))
    }

    /// Storage index of a derived column.
    pub fn derived_index(&self, field: Field) -> Option<usize> {
        match field {
            Field::Soft(i) if i < self.soft => Some(i),
            Field::Inherited(j) if j < self.inherited => Some(self.soft + j),
            _ => None,
        }
    }
}

/// One surviving assignment of a bucket table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    assignment: Vec<Value>,
    derived: Vec<Utility>,
    sum: f64,
}

impl Row {
    pub(crate) fn new(assignment: Vec<Value>, derived: Vec<Utility>, sum: f64) -> Self {
        Self {
            assignment,
            derived,
            sum,
        }
    }

    /// Values of the scope variables, in schema order.
    pub fn assignment(&self) -> &[Value] {
        &self.assignment
    }

    /// Derived column values, in schema order.
    pub fn derived(&self) -> &[Utility] {
        &self.derived
    }

    /// Local objective: the sum of all derived columns.
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

/// The joint table of a bucket after hard-constraint filtering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
    enumerated: usize,
}

impl Table {
    pub(crate) fn new(schema: TableSchema, rows: Vec<Row>, enumerated: usize) -> Self {
        Self {
            schema,
            rows,
            enumerated,
        }
    }

    /// Column layout.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Surviving rows in enumeration order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of surviving rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row survived.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows enumerated before filtering (the full product size).
    pub fn enumerated(&self) -> usize {
        self.enumerated
    }

    /// Value of `variable` in `row`, if it is a scope variable.
    pub fn value_of(&self, row: &Row, variable: &str) -> Option<Value> {
        self.schema.position(variable).map(|p| row.assignment[p])
    }

    /// Value of a derived column in `row`.
    pub fn field_of(&self, row: &Row, field: Field) -> Option<Utility> {
        self.schema.derived_index(field).map(|i| row.derived[i])
    }
}

/// One row of an h-function: a combination of values and its best objective.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HRow {
    /// Values, parallel to [`HFunction::variables`].
    pub values: Vec<Value>,
    /// Best achievable objective for this combination (`MAX`).
    pub max: Utility,
}

/// Summary function passed from an eliminated bucket to a later one.
///
/// Maps each combination of its variables to the best objective reachable
/// through everything already eliminated. `Utility::Infeasible` means no
/// feasible completion exists for that combination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HFunction {
    variables: Vec<String>,
    rows: Vec<HRow>,
}

impl HFunction {
    /// Creates an h-function from explicit rows.
    ///
    /// Variables must be distinct and every row must carry one value per
    /// variable.
    pub fn new(variables: Vec<String>, rows: Vec<HRow>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = variables.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(BucketError::InvalidConstraint(format!(
                "h-function variable `{dup}` appears more than once"
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.values.len() != variables.len())
        {
            return Err(BucketError::InvalidConstraint(format!(
                "h-function row {i} has {} values for {} variables",
                row.values.len(),
                variables.len()
            )));
        }
        Ok(Self { variables, rows })
    }

    /// An h-function over no variables.
    pub fn constant(max: Utility) -> Self {
        Self {
            variables: Vec::new(),
            rows: vec![HRow {
                values: Vec::new(),
                max,
            }],
        }
    }

    /// Key variables, in row value order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// All rows.
    pub fn rows(&self) -> &[HRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the function has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the function has no variables.
    pub fn is_constant(&self) -> bool {
        self.variables.is_empty()
    }

    /// `MAX` of the row matching `values` (given in variable order).
    pub fn get(&self, values: &[Value]) -> Option<Utility> {
        self.rows
            .iter()
            .rev()
            .find(|r| r.values == values)
            .map(|r| r.max)
    }
}
