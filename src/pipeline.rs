//! End-to-end VAR forecasting pipeline for multivariate QoS metrics.
//!
//! Stationarize, normalize, split chronologically, select the lag order,
//! forecast the held-out rows recursively and score the forecast on the
//! original scale.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use crate::models::var::{select_order, InformationCriterion, OrderScore};
use crate::preprocess::{stationarize, DifferencingStep, Stationarized};
use crate::transform::{denormalize, normalize, NormalizationParams};
use crate::utils::metrics::{evaluate, SeriesMetrics};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default QoS variables, in column order.
pub const DEFAULT_VARIABLES: [&str; 6] = ["MOS", "BW", "JIT", "RTT", "DJB", "SNR"];

/// Smallest preprocessed table the pipeline can split and fit.
pub const MIN_PIPELINE_ROWS: usize = 3;

/// Configuration for [`run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Variable names, one per table column.
    pub variables: Vec<String>,
    /// Fraction of rows used for training, in (0, 1).
    pub train_fraction: f64,
    /// Largest VAR lag order considered.
    pub max_lag: usize,
    /// Z-score the preprocessed table before fitting.
    pub normalize: bool,
    /// Difference non-stationary columns before fitting.
    pub auto_difference: bool,
    /// Criterion used to pick the lag order.
    pub criterion: InformationCriterion,
    /// Lagged differences in the ADF regression.
    pub adf_lags: usize,
    /// ADF significance level, in (0, 1).
    pub significance: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variables: DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect(),
            train_fraction: 0.7,
            max_lag: 12,
            normalize: true,
            auto_difference: true,
            criterion: InformationCriterion::Aic,
            adf_lags: 1,
            significance: 0.05,
        }
    }
}

impl PipelineConfig {
    /// Set the variable names (and so the expected table width).
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = variables;
        self
    }

    /// Set the training fraction.
    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    /// Set the largest lag order considered.
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = max_lag;
        self
    }

    /// Enable or disable normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable ADF-driven differencing.
    pub fn with_auto_difference(mut self, auto_difference: bool) -> Self {
        self.auto_difference = auto_difference;
        self
    }

    /// Set the order selection criterion.
    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the ADF augmentation lags.
    pub fn with_adf_lags(mut self, lags: usize) -> Self {
        self.adf_lags = lags;
        self
    }

    /// Set the ADF significance level.
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    /// Number of variables (N).
    pub fn n_vars(&self) -> usize {
        self.variables.len()
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.variables.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "at least one variable is required".into(),
            ));
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train_fraction must be in (0, 1), got {}",
                self.train_fraction
            )));
        }
        if self.max_lag == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_lag must be at least 1".into(),
            ));
        }
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "significance must be in (0, 1), got {}",
                self.significance
            )));
        }
        Ok(())
    }
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Differencing applied before fitting
    pub differencing: Vec<DifferencingStep>,
    /// Normalization parameters (None when normalization is off)
    pub normalization: Option<NormalizationParams>,
    /// Rows in the training split
    pub train_size: usize,
    /// Rows in the test split
    pub test_size: usize,
    /// Scores of every candidate lag order
    pub scores: Vec<OrderScore>,
    /// Selected lag order
    pub selected_lag: usize,
    /// Criterion the order was selected by
    pub criterion: InformationCriterion,
    /// Forecast of the test rows, on the preprocessed (un-normalized) scale
    pub forecasts: Table,
    /// Held-out test rows on the same scale
    pub actuals: Table,
    /// Accuracy per variable
    pub metrics: Vec<SeriesMetrics>,
}

impl PipelineReport {
    /// Time label of test row `i`, or its row index in the preprocessed table.
    pub fn time_label(&self, i: usize) -> String {
        self.actuals.row_label(i, self.train_size + i)
    }
}

/// Rows used for training out of `total`.
///
/// `round(total · fraction)`; when that leaves no more rows than `max_lag`,
/// `max(max_lag + 1, total - 1)` instead. Always leaves at least one test row.
pub fn train_size(total: usize, fraction: f64, max_lag: usize) -> usize {
    let mut size = (total as f64 * fraction).round() as usize;
    if size <= max_lag {
        size = (max_lag + 1).max(total.saturating_sub(1));
    }
    size.min(total.saturating_sub(1))
}

/// Run the forecasting pipeline on `table`.
///
/// # Errors
/// `DimensionMismatch` if the table width differs from the number of
/// configured variables, `InsufficientData` if fewer than
/// [`MIN_PIPELINE_ROWS`] rows remain after preprocessing, plus any error
/// from order selection.
pub fn run(table: &Table, config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    if table.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if table.width() != config.n_vars() {
        return Err(ForecastError::DimensionMismatch {
            expected: config.n_vars(),
            got: table.width(),
        });
    }
    info!(rows = table.len(), vars = table.width(), "starting VAR pipeline");

    let Stationarized {
        table: stationary,
        steps,
    } = if config.auto_difference {
        stationarize(table, config)?
    } else {
        Stationarized {
            table: table.clone(),
            steps: Vec::new(),
        }
    };
    if !steps.is_empty() {
        info!(
            steps = steps.len(),
            rows = stationary.len(),
            "differencing complete"
        );
    }

    let (prepared, normalization) = if config.normalize {
        let (scaled, params) = normalize(&stationary)?;
        (scaled, Some(params))
    } else {
        (stationary, None)
    };

    if prepared.len() < MIN_PIPELINE_ROWS {
        return Err(ForecastError::InsufficientData {
            needed: MIN_PIPELINE_ROWS,
            got: prepared.len(),
        });
    }

    let n_train = train_size(prepared.len(), config.train_fraction, config.max_lag);
    let (train, test) = prepared.split_at(n_train)?;
    info!(train = train.len(), test = test.len(), "split table");

    let selection = select_order(&train, config.max_lag, config.criterion)?;
    let predicted = selection
        .model
        .forecast_recursive(&train, test.len())?
        .relabel(test.labels().map(|l| l.to_vec()))?;

    let (forecasts, actuals) = match &normalization {
        Some(params) => (denormalize(&predicted, params)?, denormalize(&test, params)?),
        None => (predicted, test),
    };

    let metrics = evaluate(&actuals, &forecasts)?;
    for (name, m) in config.variables.iter().zip(metrics.iter()) {
        info!(variable = %name, mae = m.mae, rmse = m.rmse, "{name}: {m}");
    }

    Ok(PipelineReport {
        differencing: steps,
        normalization,
        train_size: train.len(),
        test_size: actuals.len(),
        scores: selection.scores,
        selected_lag: selection.selected_lag,
        criterion: selection.criterion,
        forecasts,
        actuals,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.n_vars(), 6);
        assert_eq!(config.variables[0], "MOS");
        assert_eq!(config.max_lag, 12);
        assert_relative_eq!(config.train_fraction, 0.7);
        assert!(config.normalize && config.auto_difference);
        assert_eq!(config.criterion, InformationCriterion::Aic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = PipelineConfig::default();
        assert!(base.clone().with_train_fraction(1.0).validate().is_err());
        assert!(base.clone().with_train_fraction(0.0).validate().is_err());
        assert!(base.clone().with_train_fraction(f64::NAN).validate().is_err());
        assert!(base.clone().with_max_lag(0).validate().is_err());
        assert!(base.clone().with_significance(1.5).validate().is_err());
        assert!(base.with_variables(Vec::new()).validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"max_lag": 4, "criterion": "bic"}"#).unwrap();
        assert_eq!(config.max_lag, 4);
        assert_eq!(config.criterion, InformationCriterion::Bic);
        assert_eq!(config.variables.len(), 6);
        assert_relative_eq!(config.significance, 0.05);
    }

    #[test]
    fn train_size_rule() {
        // round(100 · 0.7) = 70
        assert_eq!(train_size(100, 0.7, 12), 70);
        // round(15 · 0.7) <= 12, so max(13, 14) = 14
        assert_eq!(train_size(15, 0.7, 12), 14);
        // round(20 · 0.7) = 14 > 12
        assert_eq!(train_size(20, 0.7, 12), 14);
        // clamped to leave one test row
        assert_eq!(train_size(5, 0.7, 12), 4);
        assert_eq!(train_size(3, 0.5, 1), 2);
    }

    #[test]
    fn run_rejects_width_mismatch() {
        let table = Table::new(vec![vec![1.0, 2.0]; 30]).unwrap();
        assert!(matches!(
            run(&table, &PipelineConfig::default()),
            Err(ForecastError::DimensionMismatch {
                expected: 6,
                got: 2
            })
        ));
    }

    #[test]
    fn run_rejects_empty_table() {
        let table = Table::empty(6);
        assert!(matches!(
            run(&table, &PipelineConfig::default()),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn run_needs_three_rows() {
        let config = PipelineConfig::default()
            .with_variables(vec!["A".into()])
            .with_auto_difference(false);
        let table = Table::new(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(matches!(
            run(&table, &config),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn time_label_falls_back_to_row_index() {
        let config = PipelineConfig::default()
            .with_variables(vec!["A".into(), "B".into()])
            .with_auto_difference(false)
            .with_normalize(false)
            .with_max_lag(1);
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|t| vec![(t as f64 * 0.7).sin(), (t as f64 * 0.3).cos()])
            .collect();
        let report = run(&Table::new(rows).unwrap(), &config).unwrap();

        assert_eq!(report.train_size, 14);
        assert_eq!(report.test_size, 6);
        assert_eq!(report.time_label(0), "14");
        assert_eq!(report.time_label(5), "19");
    }
}
