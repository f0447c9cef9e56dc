//! Single-bucket computation.
//!
//! One elimination step of bucket elimination: build the joint table of a
//! variable's bucket, then max-marginalize the variable away.
//!
//! # Key Components
//!
//! - **Table Builder**: [`TableBuilder`] enumerates the scope product,
//!   evaluates soft constraints and inherited h-functions, filters hard
//!   constraint violations and sums each surviving row.
//! - **H-Function Extractor**: [`HFunctionExtractor`] produces the outgoing
//!   [`HFunction`] over the full product of the remaining variables.
//! - **Bucket**: [`Bucket`] owns one variable's constraints and its
//!   computed [`Table`] / [`HFunction`].
//!
//! # Parallelism
//!
//! Rows are independent, so with the `parallel` feature the builder
//! evaluates them with rayon. Output order is always the enumeration order.

mod builder;
mod config;
mod display;
mod extractor;
mod runner;
mod types;

pub use builder::TableBuilder;
pub use config::BucketConfig;
pub use extractor::HFunctionExtractor;
pub use runner::{Bucket, BucketTables};
pub use types::{Field, HFunction, HRow, Row, Table, TableSchema};
