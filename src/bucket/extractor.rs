//! Max-marginalization of a bucket table into an h-function.

use super::builder::{decode, product_len};
use super::types::{HFunction, HRow, Table};
use crate::error::{BucketError, Result};
use crate::model::{Domains, Utility, Value};
use std::collections::HashMap;

/// Extracts the outgoing h-function of a bucket.
pub struct HFunctionExtractor;

impl HFunctionExtractor {
    /// Eliminates `variable` from `table` by taking, for every combination of
    /// the remaining scope variables, the maximum row objective.
    ///
    /// The result always holds the full product of the remaining variables'
    /// domains; combinations reached by no surviving row get
    /// `Utility::Infeasible`.
    ///
    /// # Errors
    ///
    /// [`BucketError::TableTooLarge`] when `domains` describe more
    /// combinations than `table` enumerated, i.e. they are not the domains
    /// the table was built from. The limit is the table's product size.
    pub fn extract(table: &Table, variable: &str, domains: &Domains) -> Result<HFunction> {
        let schema = table.schema();
        let checking: Vec<(usize, &String)> = schema
            .scope()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_str() != variable && domains.contains(v))
            .collect();

        let axes: Vec<&[Value]> = checking
            .iter()
            .map(|(_, v)| domains.values(v))
            .collect::<Result<_>>()?;
        // A sub-product of the table's own product never exceeds it.
        let limit = table.enumerated();
        let total = product_len(&axes)
            .filter(|&n| n <= limit)
            .ok_or(BucketError::TableTooLarge { limit })?;

        let mut rows: Vec<HRow> = Vec::with_capacity(total);
        let mut index: HashMap<Vec<Value>, usize> = HashMap::with_capacity(total);
        for i in 0..total {
            let values = decode(i, &axes);
            index.insert(values.clone(), i);
            rows.push(HRow {
                values,
                max: Utility::Infeasible,
            });
        }

        for row in table.rows() {
            let key: Vec<Value> = checking
                .iter()
                .map(|&(p, _)| row.assignment()[p])
                .collect();
            if let Some(&i) = index.get(&key) {
                rows[i].max = rows[i].max.max(Utility::Feasible(row.sum()));
            }
        }

        let variables = checking.into_iter().map(|(_, v)| v.clone()).collect();
        HFunction::new(variables, rows)
    }
}
