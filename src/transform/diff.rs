//! Differencing utilities for series and tables.

use crate::core::Table;
use crate::error::{ForecastError, Result};

/// Apply differencing to a series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` elements shorter than the input.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Difference a single column of a table once.
///
/// Row `t` of the output is row `t + 1` of the input with column `column`
/// replaced by `x[t + 1] - x[t]`; all other columns pass through unchanged.
/// The first row and its label are dropped so every column stays aligned.
pub fn difference_column(table: &Table, column: usize) -> Result<Table> {
    if table.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if column >= table.width() {
        return Err(ForecastError::IndexOutOfBounds {
            index: column,
            size: table.width(),
        });
    }

    let rows: Vec<Vec<f64>> = table
        .rows()
        .windows(2)
        .map(|w| {
            let mut row = w[1].clone();
            row[column] = w[1][column] - w[0][column];
            row
        })
        .collect();

    let labels = table.labels().map(|l| l[1..].to_vec());

    Table::from_parts(rows, labels, table.width())
}
