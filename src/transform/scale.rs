//! Z-score normalization of tables.
//!
//! Parameters are fitted once per column and kept so that forecasts and
//! held-out actuals can be mapped back onto the original scale before any
//! error metric is computed.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Standard deviations below this are treated as zero and replaced by 1.
pub const MIN_SCALE: f64 = 1e-10;

/// Center and scale of a single variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    /// Column mean
    pub mean: f64,
    /// Population standard deviation (1 for constant columns)
    pub std: f64,
}

impl ColumnScale {
    /// Fit center and scale to a series.
    ///
    /// Uses the population standard deviation (divide by T).
    pub fn fit(series: &[f64]) -> Self {
        if series.is_empty() {
            return Self {
                mean: 0.0,
                std: 1.0,
            };
        }
        let mean = series.iter().mean();
        let std = series.iter().population_std_dev();
        let std = if std.is_finite() && std >= MIN_SCALE {
            std
        } else {
            1.0
        };
        Self { mean, std }
    }

    /// Map a value onto the normalized scale.
    pub fn transform(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }

    /// Map a normalized value back onto the original scale.
    pub fn inverse(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}

/// Per-column normalization parameters for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    columns: Vec<ColumnScale>,
}

impl NormalizationParams {
    /// Fit parameters to every column of a table.
    pub fn fit(table: &Table) -> Result<Self> {
        if table.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        let columns = (0..table.width())
            .map(|j| table.column(j).map(|c| ColumnScale::fit(&c)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Build parameters from known column scales.
    pub fn from_columns(columns: Vec<ColumnScale>) -> Self {
        Self { columns }
    }

    /// Column scales in variable order.
    pub fn columns(&self) -> &[ColumnScale] {
        &self.columns
    }

    /// Number of variables covered.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Z-score a table with these parameters.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        self.check_width(table)?;
        Ok(table.map_rows(|row| {
            row.iter()
                .zip(self.columns.iter())
                .map(|(&x, s)| s.transform(x))
                .collect()
        }))
    }

    /// Undo the z-score of a table with these parameters.
    pub fn invert(&self, table: &Table) -> Result<Table> {
        self.check_width(table)?;
        Ok(table.map_rows(|row| {
            row.iter()
                .zip(self.columns.iter())
                .map(|(&z, s)| s.inverse(z))
                .collect()
        }))
    }

    fn check_width(&self, table: &Table) -> Result<()> {
        if table.width() != self.columns.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.columns.len(),
                got: table.width(),
            });
        }
        Ok(())
    }
}

/// Z-score every column of a table.
///
/// x_scaled = (x - mean) / std
///
/// # Returns
/// The normalized table and the parameters needed to invert it.
pub fn normalize(table: &Table) -> Result<(Table, NormalizationParams)> {
    let params = NormalizationParams::fit(table)?;
    let normalized = params.apply(table)?;
    Ok((normalized, params))
}

/// Map a normalized table back onto the original scale.
pub fn denormalize(table: &Table, params: &NormalizationParams) -> Result<Table> {
    params.invert(table)
}
