//! Variable domains.

use crate::error::{BucketError, Result};
use std::collections::BTreeMap;

/// A discrete domain value.
pub type Value = i64;

/// Mapping from variable name to its ordered, finite set of values.
///
/// Values keep their insertion order; duplicates are dropped on insertion
/// so every domain behaves as a set.
///
/// # Examples
///
/// ```
/// use u_bucket::model::Domains;
///
/// let domains = Domains::new()
///     .with("X", [0, 1])
///     .with("Y", [2, 1, 2]);
/// assert_eq!(domains.values("Y").unwrap(), &[2, 1]);
/// assert!(domains.values("Z").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Domains {
    entries: BTreeMap<String, Vec<Value>>,
}

impl Domains {
    /// Creates an empty domain map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the domain of `variable`.
    pub fn insert(&mut self, variable: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        let mut unique: Vec<Value> = Vec::new();
        for v in values {
            if !unique.contains(&v) {
                unique.push(v);
            }
        }
        self.entries.insert(variable.into(), unique);
    }

    /// Builder form of [`Domains::insert`].
    pub fn with(mut self, variable: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        self.insert(variable, values);
        self
    }

    /// Returns the values of `variable`, or [`BucketError::MissingDomain`].
    pub fn values(&self, variable: &str) -> Result<&[Value]> {
        self.entries
            .get(variable)
            .map(Vec::as_slice)
            .ok_or_else(|| BucketError::MissingDomain {
                variable: variable.to_string(),
            })
    }

    /// Whether `variable` has a domain entry.
    pub fn contains(&self, variable: &str) -> bool {
        self.entries.contains_key(variable)
    }

    /// Iterates over variable names in sorted order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of variables with a domain.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no domain has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, I: IntoIterator<Item = Value>> FromIterator<(S, I)> for Domains {
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        let mut domains = Domains::new();
        for (name, values) in iter {
            domains.insert(name, values);
        }
        domains
    }
}
