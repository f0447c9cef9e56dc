//! Text-grid rendering of tables and h-functions.

use super::runner::Bucket;
use super::types::{HFunction, Table};
use std::fmt;

const MIN_WIDTH: usize = 3;

/// Writes `header` and `rows` as an aligned grid:
///
/// ```text
///  X   | Y   | SUM |
/// -----|-----|-----|
///  0   | 1   | 1   |
/// ```
fn write_grid(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = (0..header.len())
        .map(|c| {
            rows.iter()
                .map(|r| r[c].len())
                .chain([header[c].len(), MIN_WIDTH])
                .max()
                .unwrap_or(MIN_WIDTH)
        })
        .collect();

    let write_line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
        for (cell, &w) in cells.iter().zip(&widths) {
            write!(f, " {cell:<w$} |")?;
        }
        writeln!(f)
    };

    write_line(f, header)?;
    for &w in &widths {
        write!(f, "{}|", "-".repeat(w + 2))?;
    }
    writeln!(f)?;
    for row in rows {
        write_line(f, row)?;
    }
    Ok(())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema = self.schema();
        let header: Vec<String> = schema
            .scope()
            .iter()
            .cloned()
            .chain(schema.derived().map(|field| field.to_string()))
            .chain(["SUM".to_string()])
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| {
                row.assignment()
                    .iter()
                    .map(|v| v.to_string())
                    .chain(row.derived().iter().map(|u| u.to_string()))
                    .chain([row.sum().to_string()])
                    .collect()
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for HFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self
            .variables()
            .iter()
            .cloned()
            .chain(["MAX".to_string()])
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| {
                row.values
                    .iter()
                    .map(|v| v.to_string())
                    .chain([row.max.to_string()])
                    .collect()
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bucket of variable ({})", self.variable())?;
        writeln!(f, "\tsoft constraints: {}", self.soft_constraints().len())?;
        write!(f, "\thard constraints: {}", self.hard_constraints().len())
    }
}
