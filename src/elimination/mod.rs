//! Full bucket elimination over a given order.
//!
//! Partitions the constraints of a [`Problem`] into one [`Bucket`] per
//! variable, computes the buckets in elimination order while forwarding each
//! outgoing h-function to the bucket of its earliest-eliminated variable,
//! then recovers an optimal assignment by back-substitution.
//!
//! The elimination order is always supplied by the caller.
//!
//! [`Bucket`]: crate::bucket::Bucket
//!
//! # References
//!
//! Dechter (2003), "Constraint Processing", ch. 13

mod runner;
mod types;

pub use runner::EliminationRunner;
pub use types::{EliminationResult, Problem};
