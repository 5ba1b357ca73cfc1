//! Stationarity tests for time series.
//!
//! Provides the Augmented Dickey-Fuller unit-root test used to decide
//! whether a QoS metric must be differenced before VAR estimation.

use crate::transform::difference;
use crate::utils::linalg::{inverse, solve_least_squares};
use nalgebra::DMatrix;

/// Series shorter than this cannot be tested.
pub const ADF_MIN_OBSERVATIONS: usize = 10;

/// Significance level used for [`StationarityResult::is_stationary`].
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value (approximate)
    pub p_value: f64,
    /// Number of lagged differences in the regression
    pub lags: usize,
    /// Whether series appears stationary at 5%
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undecided(statistic: f64, lags: usize) -> Self {
        Self {
            statistic,
            p_value: 1.0,
            lags,
            is_stationary: false,
            critical_values: CriticalValues::ADF,
        }
    }

    /// Whether the unit-root null is rejected at `significance`.
    pub fn is_stationary_at(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// Fixed ADF thresholds used for the p-value buckets.
    pub const ADF: CriticalValues = CriticalValues {
        cv_1pct: -3.43,
        cv_5pct: -2.86,
        cv_10pct: -2.57,
    };
}

/// Augmented Dickey-Fuller test for a unit root (non-stationarity).
///
/// Tests the null hypothesis that the series has a unit root. Rejection
/// implies stationarity. Runs the regression
///
/// Δy_t = α + δ·(t+1) + β·y_t + Σ γ_i·Δy_{t-i} + ε_t
///
/// and reports the t-ratio of β.
///
/// # Arguments
/// * `series` - Time series data
/// * `lags` - Number of lagged differences (1 for the QoS pipeline)
///
/// # Returns
/// `StationarityResult` with the statistic and an approximate p-value.
/// Series with fewer than [`ADF_MIN_OBSERVATIONS`] points, or too few
/// regression rows, report statistic 0 and p-value 1.
///
/// The p-value is a coarse bucket lookup against fixed critical values, not
/// the MacKinnon distribution.
pub fn adf_test(series: &[f64], lags: usize) -> StationarityResult {
    let n = series.len();
    if n < ADF_MIN_OBSERVATIONS || n <= lags + 1 {
        return StationarityResult::undecided(0.0, lags);
    }

    let diff = difference(series, 1);
    let rows = n - 1 - lags;
    let k = 3 + lags;
    if rows <= 3 || rows <= k {
        return StationarityResult::undecided(0.0, lags);
    }

    let mut x = DMatrix::zeros(rows, k);
    let mut y = DMatrix::zeros(rows, 1);
    for t in lags..n - 1 {
        let r = t - lags;
        y[(r, 0)] = diff[t];
        x[(r, 0)] = 1.0;
        x[(r, 1)] = (t + 1) as f64;
        x[(r, 2)] = series[t];
        for l in 1..=lags {
            x[(r, 2 + l)] = diff[t - l];
        }
    }

    let statistic = match level_t_ratio(&x, &y) {
        Some(stat) if stat.is_finite() => stat,
        Some(stat) => return StationarityResult::undecided(stat, lags),
        None => return StationarityResult::undecided(f64::NAN, lags),
    };

    let p_value = adf_p_value(statistic);

    StationarityResult {
        statistic,
        p_value,
        lags,
        is_stationary: p_value < DEFAULT_SIGNIFICANCE,
        critical_values: CriticalValues::ADF,
    }
}

/// t-ratio of the lagged-level coefficient (column 2 of the design).
fn level_t_ratio(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<f64> {
    let beta = solve_least_squares(x, y).ok()?.coefficients;
    let residuals = y - x * &beta;
    let rss: f64 = residuals.iter().map(|e| e * e).sum();
    let df = (x.nrows() - x.ncols()) as f64;
    let sigma_sq = rss / df;

    let xtx = x.transpose() * x;
    let cov = inverse(&xtx).ok()?;
    let se = (cov[(2, 2)] * sigma_sq).abs().sqrt();

    Some(beta[(2, 0)] / se)
}

/// Approximate p-value for the ADF statistic.
fn adf_p_value(t_stat: f64) -> f64 {
    let cv = CriticalValues::ADF;
    if t_stat <= cv.cv_1pct {
        0.01
    } else if t_stat <= cv.cv_5pct {
        0.05
    } else if t_stat <= cv.cv_10pct {
        0.10
    } else {
        0.20
    }
}
