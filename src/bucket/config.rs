//! Bucket computation configuration.

use crate::error::{BucketError, Result};

/// Configuration for table construction.
///
/// # Examples
///
/// ```
/// use u_bucket::bucket::BucketConfig;
///
/// let config = BucketConfig::default()
///     .with_parallel(true)
///     .with_parallel_threshold(1024)
///     .with_max_rows(1_000_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketConfig {
    /// Whether to evaluate rows in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub parallel: bool,

    /// Minimum number of candidate rows before parallel evaluation is used.
    pub parallel_threshold: usize,

    /// Refuse to enumerate tables with more candidate rows than this.
    ///
    /// `None` only guards against `usize` overflow (the default).
    pub max_rows: Option<usize>,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 4096,
            max_rows: None,
        }
    }
}

impl BucketConfig {
    /// Enables or disables parallel row evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the row count from which parallel evaluation kicks in.
    pub fn with_parallel_threshold(mut self, rows: usize) -> Self {
        self.parallel_threshold = rows;
        self
    }

    /// Sets the maximum number of candidate rows per table.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Preset for single-threaded, reproducible debugging runs.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_rows == Some(0) {
            return Err(BucketError::InvalidConfig(
                "max_rows must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether a table of `rows` candidates should be evaluated in parallel.
    pub(crate) fn use_parallel(&self, rows: usize) -> bool {
        self.parallel && rows >= self.parallel_threshold
    }
}
