//! Bucket elimination for discrete constraint optimization.
//!
//! Solves weighted CSP / MAP-style problems: maximize a sum of soft
//! constraints over finite-domain variables subject to hard inequality
//! constraints, by eliminating variables one at a time.
//!
//! - **Model**: domains, soft constraints, hard constraints and the
//!   feasibility-tagged [`model::Utility`].
//! - **Bucket**: the single-bucket computation. Builds the joint table of a
//!   variable's constraints and inherited h-functions, filters infeasible
//!   rows, and max-marginalizes the variable into an outgoing h-function.
//! - **Elimination**: a driver that runs every bucket along a given order
//!   and recovers an optimal assignment.
//!
//! # Architecture
//!
//! The crate never chooses an elimination order and never loads problem
//! definitions; both are inputs. Tables are exact, so memory grows with the
//! product of the domain sizes in each bucket scope.

pub mod bucket;
pub mod elimination;
pub mod error;
pub mod model;

pub use error::{BucketError, Result};
