//! Soft and hard constraint definitions.

use super::domain::Value;
use crate::error::{BucketError, Result};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// A pure scalar function of a fixed number of discrete arguments.
///
/// Returning `f64::NEG_INFINITY` vetoes the assignment (it is read as
/// infeasible); returning NaN is a configuration error.
///
/// # Examples
///
/// ```ignore
/// struct Affinity;
///
/// impl CostFunction for Affinity {
///     fn arity(&self) -> usize { 2 }
///     fn evaluate(&self, args: &[Value]) -> f64 {
///         if args[0] == args[1] { 1.0 } else { 0.0 }
///     }
/// }
/// ```
pub trait CostFunction: Send + Sync {
    /// Number of arguments the function expects.
    fn arity(&self) -> usize;

    /// Evaluates the function. `args.len()` equals [`CostFunction::arity`].
    fn evaluate(&self, args: &[Value]) -> f64;
}

/// A closure with an explicitly declared arity.
pub struct FnCost<F> {
    arity: usize,
    f: F,
}

impl<F> FnCost<F>
where
    F: Fn(&[Value]) -> f64 + Send + Sync,
{
    /// Wraps `f`, declaring that it takes `arity` arguments.
    pub fn new(arity: usize, f: F) -> Self {
        Self { arity, f }
    }
}

impl<F> CostFunction for FnCost<F>
where
    F: Fn(&[Value]) -> f64 + Send + Sync,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn evaluate(&self, args: &[Value]) -> f64 {
        (self.f)(args)
    }
}

/// A cost given by an explicit table of argument tuples.
///
/// Tuples absent from the table evaluate to `default`.
#[derive(Debug, Clone)]
pub struct TableCost {
    arity: usize,
    entries: HashMap<Vec<Value>, f64>,
    default: f64,
}

impl TableCost {
    /// Creates an empty table over `arity` arguments.
    pub fn new(arity: usize, default: f64) -> Self {
        Self {
            arity,
            entries: HashMap::new(),
            default,
        }
    }

    /// Sets the value for one argument tuple.
    pub fn with_entry(mut self, args: impl Into<Vec<Value>>, value: f64) -> Self {
        self.entries.insert(args.into(), value);
        self
    }

    /// Number of explicit entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl CostFunction for TableCost {
    fn arity(&self) -> usize {
        self.arity
    }

    fn evaluate(&self, args: &[Value]) -> f64 {
        self.entries.get(args).copied().unwrap_or(self.default)
    }
}

/// A weighted constraint: a cost function applied to named variables.
///
/// The function receives the variables' values in `params` order.
/// Cloning is cheap; the function is shared.
///
/// # Examples
///
/// ```
/// use u_bucket::model::SoftConstraint;
///
/// let sum = SoftConstraint::from_fn(["X", "Y"], |v| (v[0] + v[1]) as f64);
/// assert_eq!(sum.params(), &["X".to_string(), "Y".to_string()]);
/// assert_eq!(sum.evaluate(&[1, 2]), 3.0);
/// ```
#[derive(Clone)]
pub struct SoftConstraint {
    cost: Arc<dyn CostFunction>,
    params: Vec<String>,
}

impl SoftConstraint {
    /// Applies `cost` to the variables `params`.
    ///
    /// The arity is checked when the constraint is used in a table, so the
    /// error can name the constraint's position in its bucket.
    pub fn new<C, I, S>(cost: C, params: I) -> Self
    where
        C: CostFunction + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cost: Arc::new(cost),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Convenience: a closure whose arity is the number of listed variables.
    pub fn from_fn<I, S, F>(params: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[Value]) -> f64 + Send + Sync + 'static,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        Self {
            cost: Arc::new(FnCost::new(params.len(), f)),
            params,
        }
    }

    /// Argument variables, in call order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Declared arity of the underlying function.
    pub fn arity(&self) -> usize {
        self.cost.arity()
    }

    /// Evaluates the underlying function.
    pub fn evaluate(&self, args: &[Value]) -> f64 {
        self.cost.evaluate(args)
    }
}

impl fmt::Debug for SoftConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftConstraint")
            .field("arity", &self.cost.arity())
            .field("params", &self.params)
            .finish()
    }
}

/// A hard "not all equal" constraint over two or more variables.
///
/// An assignment violates the constraint when at least two of its variables
/// are assigned and all assigned values coincide. Over three or more
/// variables this only rejects the case where *every* value is the same;
/// use [`InequalityConstraint::all_different`] for pairwise distinctness.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InequalityConstraint {
    variables: BTreeSet<String>,
}

impl InequalityConstraint {
    /// Creates the constraint. Fails unless at least two distinct variables are given.
    pub fn new<I, S>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: BTreeSet<String> = variables.into_iter().map(Into::into).collect();
        if variables.len() < 2 {
            return Err(BucketError::InvalidConstraint(format!(
                "inequality needs at least 2 distinct variables, got {variables:?}"
            )));
        }
        Ok(Self { variables })
    }

    /// Expands a variable set into one pairwise constraint per pair.
    pub fn all_different<I, S>(variables: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = variables
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if names.len() < 2 {
            return Err(BucketError::InvalidConstraint(format!(
                "all-different needs at least 2 distinct variables, got {names:?}"
            )));
        }
        let mut pairs = Vec::with_capacity(names.len() * (names.len() - 1) / 2);
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                pairs.push(Self::new([a.clone(), b.clone()])?);
            }
        }
        Ok(pairs)
    }

    /// Constrained variables, sorted.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    /// Whether the constraint mentions `variable`.
    pub fn contains(&self, variable: &str) -> bool {
        self.variables.contains(variable)
    }

    /// Checks an assignment given as a lookup; unassigned variables are skipped.
    pub fn is_violated_by<F>(&self, value_of: F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        coincide(self.variables.iter().filter_map(|v| value_of(v)))
    }
}

/// True when the iterator yields at least two values and all are equal.
pub(crate) fn coincide(mut values: impl Iterator<Item = Value>) -> bool {
    let Some(first) = values.next() else {
        return false;
    };
    let mut present = 1usize;
    for v in values {
        if v != first {
            return false;
        }
        present += 1;
    }
    present > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_cost() {
        let c = FnCost::new(2, |a: &[Value]| (a[0] * a[1]) as f64);
        assert_eq!(c.arity(), 2);
        assert_eq!(c.evaluate(&[3, 4]), 12.0);
    }

    #[test]
    fn test_table_cost_default() {
        let c = TableCost::new(2, -1.0)
            .with_entry([0, 1], 5.0)
            .with_entry([1, 0], 2.0);
        assert_eq!(c.entry_count(), 2);
        assert_eq!(c.evaluate(&[0, 1]), 5.0);
        assert_eq!(c.evaluate(&[1, 1]), -1.0);
    }

    #[test]
    fn test_soft_constraint_declared_arity() {
        let c = SoftConstraint::new(FnCost::new(3, |_: &[Value]| 0.0), ["A", "B"]);
        assert_eq!(c.arity(), 3);
        assert_eq!(c.params().len(), 2);
        assert!(format!("{c:?}").contains("arity: 3"));
    }

    #[test]
    fn test_inequality_needs_two_variables() {
        assert!(InequalityConstraint::new(["X"]).is_err());
        assert!(InequalityConstraint::new(["X", "X"]).is_err());
        assert!(InequalityConstraint::new(["X", "Y"]).is_ok());
    }

    #[test]
    fn test_inequality_all_equal_semantics() {
        let c = InequalityConstraint::new(["A", "B", "C"]).unwrap();
        let assign = |a: Value, b: Value, c: Value| {
            move |v: &str| match v {
                "A" => Some(a),
                "B" => Some(b),
                "C" => Some(c),
                _ => None,
            }
        };
        assert!(c.is_violated_by(assign(1, 1, 1)));
        // only a pair coincides: not a violation
        assert!(!c.is_violated_by(assign(1, 1, 2)));
    }

    #[test]
    fn test_inequality_ignores_unassigned() {
        let c = InequalityConstraint::new(["A", "B", "C"]).unwrap();
        assert!(c.is_violated_by(|v| if v == "C" { None } else { Some(0) }));
        assert!(!c.is_violated_by(|v| if v == "A" { Some(0) } else { None }));
    }

    #[test]
    fn test_all_different_pairs() {
        let pairs = InequalityConstraint::all_different(["C", "A", "B"]).unwrap();
        assert_eq!(pairs.len(), 3);
        let names: Vec<Vec<&str>> = pairs.iter().map(|p| p.variables().collect()).collect();
        assert_eq!(names, vec![vec!["A", "B"], vec!["A", "C"], vec!["B", "C"]]);
        assert!(InequalityConstraint::all_different(["A"]).is_err());
    }

    #[test]
    fn test_coincide() {
        assert!(!coincide(std::iter::empty()));
        assert!(!coincide([4].into_iter()));
        assert!(coincide([4, 4].into_iter()));
        assert!(!coincide([4, 5, 4].into_iter()));
    }
}
