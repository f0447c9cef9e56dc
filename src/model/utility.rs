//! Feasibility-tagged objective values.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// An objective contribution that is either feasible or explicitly infeasible.
///
/// `Infeasible` orders below every feasible value, so `max` over utilities
/// treats it as "nothing reaches here". Addition short-circuits: any
/// infeasible term makes the total infeasible.
///
/// # Examples
///
/// ```
/// use u_bucket::model::Utility;
///
/// let total: Utility = [Utility::Feasible(1.0), Utility::Feasible(2.5)].into_iter().sum();
/// assert_eq!(total, Utility::Feasible(3.5));
///
/// assert_eq!(Utility::from(f64::NEG_INFINITY), Utility::Infeasible);
/// assert_eq!(total + Utility::Infeasible, Utility::Infeasible);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Utility {
    /// No feasible assignment contributes here.
    Infeasible,
    /// A feasible contribution.
    Feasible(f64),
}

impl Utility {
    /// Whether this utility is feasible.
    pub fn is_feasible(self) -> bool {
        matches!(self, Utility::Feasible(_))
    }

    /// The feasible value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Utility::Feasible(v) => Some(v),
            Utility::Infeasible => None,
        }
    }

    /// The greater of two utilities.
    pub fn max(self, other: Utility) -> Utility {
        match (self, other) {
            (Utility::Infeasible, u) | (u, Utility::Infeasible) => u,
            (Utility::Feasible(a), Utility::Feasible(b)) => Utility::Feasible(a.max(b)),
        }
    }
}

impl From<f64> for Utility {
    fn from(value: f64) -> Self {
        if value == f64::NEG_INFINITY {
            Utility::Infeasible
        } else {
            Utility::Feasible(value)
        }
    }
}

impl Add for Utility {
    type Output = Utility;

    fn add(self, rhs: Utility) -> Utility {
        match (self, rhs) {
            (Utility::Feasible(a), Utility::Feasible(b)) => Utility::Feasible(a + b),
            _ => Utility::Infeasible,
        }
    }
}

impl Sum for Utility {
    fn sum<I: Iterator<Item = Utility>>(iter: I) -> Utility {
        let mut total = 0.0;
        for u in iter {
            match u {
                Utility::Feasible(v) => total += v,
                Utility::Infeasible => return Utility::Infeasible,
            }
        }
        Utility::Feasible(total)
    }
}

impl fmt::Display for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Utility::Feasible(v) => write!(f, "{v}"),
            Utility::Infeasible => f.write_str("-inf"),
        }
    }
}
