//! Stationarity preprocessing by repeated single-column differencing.

use crate::core::Table;
use crate::error::Result;
use crate::pipeline::PipelineConfig;
use crate::transform::{difference_column, scale::MIN_SCALE};
use crate::validation::{adf_test, ADF_MIN_OBSERVATIONS};
use statrs::statistics::Statistics;
use tracing::{debug, info};

/// One differencing decision made by [`stationarize`].
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencingStep {
    /// Column that failed the ADF test and was differenced
    pub column: usize,
    /// ADF statistic before differencing
    pub statistic: f64,
    /// ADF p-value before differencing
    pub p_value: f64,
    /// Table length after the step
    pub length_after: usize,
}

/// A stationarized table and the steps that produced it.
#[derive(Debug, Clone)]
pub struct Stationarized {
    /// Table after differencing
    pub table: Table,
    /// Differencing steps in the order they were applied
    pub steps: Vec<DifferencingStep>,
}

impl Stationarized {
    /// Number of times `column` was differenced.
    pub fn times_differenced(&self, column: usize) -> usize {
        self.steps.iter().filter(|s| s.column == column).count()
    }
}

/// Difference columns until every column passes the ADF test.
///
/// Columns are tested in order. The first column whose p-value is at or
/// above `config.significance` is differenced once, every column loses its
/// first row, and the scan restarts from column 0. The loop ends after a
/// full pass with no differencing.
///
/// A column with fewer than [`ADF_MIN_OBSERVATIONS`] values, or with
/// (near) zero variance, counts as stationary. Each step shortens the table
/// by one row, so the loop always terminates.
pub fn stationarize(table: &Table, config: &PipelineConfig) -> Result<Stationarized> {
    let mut current = table.clone();
    let mut steps = Vec::new();

    'scan: loop {
        for j in 0..current.width() {
            let series = current.column(j)?;
            let name = config.variables.get(j).map(String::as_str).unwrap_or("?");

            if series.len() < ADF_MIN_OBSERVATIONS {
                debug!(
                    column = j,
                    variable = name,
                    len = series.len(),
                    "too short for ADF, treated as stationary"
                );
                continue;
            }
            if is_constant(&series) {
                debug!(column = j, variable = name, "zero variance, treated as stationary");
                continue;
            }

            let adf = adf_test(&series, config.adf_lags);
            let stationary = adf.is_stationary_at(config.significance);
            info!(
                column = j,
                variable = name,
                statistic = adf.statistic,
                p_value = adf.p_value,
                stationary,
                "ADF test"
            );

            if !stationary {
                current = difference_column(&current, j)?;
                steps.push(DifferencingStep {
                    column: j,
                    statistic: adf.statistic,
                    p_value: adf.p_value,
                    length_after: current.len(),
                });
                info!(column = j, variable = name, len = current.len(), "differenced column");
                continue 'scan;
            }
        }
        break;
    }

    Ok(Stationarized {
        table: current,
        steps,
    })
}

fn is_constant(series: &[f64]) -> bool {
    let std = series.iter().population_std_dev();
    !std.is_finite() || std < MIN_SCALE
}
