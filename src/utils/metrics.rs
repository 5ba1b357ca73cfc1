//! Accuracy metrics for forecast evaluation.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use std::fmt;

/// Accuracy of the forecast for a single variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error in percent, over rows with a nonzero
    /// actual (None if every actual is zero)
    pub mape: Option<f64>,
}

impl fmt::Display for SeriesMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAE: {:.6}, RMSE: {:.6}, MAPE: ", self.mae, self.rmse)?;
        match self.mape {
            Some(mape) => write!(f, "{mape:.3}%"),
            None => write!(f, "NaN"),
        }
    }
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Arguments
/// * `actual` - Actual observed values
/// * `predicted` - Predicted/forecast values
///
/// # Returns
/// `SeriesMetrics` with MAE, RMSE and MAPE
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<SeriesMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }

    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    Ok(SeriesMetrics {
        mae: mae(actual, predicted),
        rmse: rmse(actual, predicted),
        mape: mape(actual, predicted),
    })
}

/// Per-variable metrics for a forecast table against held-out actuals.
///
/// Both tables must already be on the same (original) scale.
pub fn evaluate(actual: &Table, predicted: &Table) -> Result<Vec<SeriesMetrics>> {
    if actual.width() != predicted.width() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.width(),
            got: predicted.width(),
        });
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    (0..actual.width())
        .map(|j| calculate_metrics(&actual.column(j)?, &predicted.column(j)?))
        .collect()
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Calculate MAPE (percent) between two slices.
///
/// Rows with a zero actual are left out of both the sum and the count.
/// Returns `None` when no row has a nonzero actual.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() != predicted.len() {
        return None;
    }
    let (sum, count) = actual
        .iter()
        .zip(predicted.iter())
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(100.0 * sum / count as f64)
    }
}
