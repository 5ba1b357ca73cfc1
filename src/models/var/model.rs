//! VAR (Vector Autoregression) model.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::linalg::{solve_least_squares, SolveMethod};
use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;
use tracing::debug;

/// VAR(p) forecasting model.
///
/// Each variable at time t is a linear function of an intercept and the p
/// most recent observations of all N variables:
///
/// y_t = c + A_1 y_{t-1} + ... + A_p y_{t-p} + e_t
///
/// The coefficients are stored as a single `(1 + N·p) × N` matrix `B` with
/// one column per equation: row 0 is the intercept, rows `1 + (l-1)·N ..
/// 1 + l·N` are the lag-`l` block. A regressor vector is laid out the same
/// way, `[1, y_{t-1}, ..., y_{t-p}]`, so a prediction is `Bᵀ x`.
#[derive(Debug, Clone)]
pub struct VAR {
    /// Lag order (p).
    lag: usize,
    /// Number of variables (N).
    n_vars: usize,
    /// Coefficient matrix `B`, present once fitted.
    coefficients: Option<DMatrix<f64>>,
    /// Decomposition used by the last fit.
    fit_method: Option<SolveMethod>,
}

impl VAR {
    /// Create an unfitted VAR(p) model for `n_vars` variables.
    pub fn new(n_vars: usize, lag: usize) -> Self {
        Self {
            lag,
            n_vars,
            coefficients: None,
            fit_method: None,
        }
    }

    /// Create a model from a known coefficient matrix `B`.
    ///
    /// `B` must have `1 + N·lag` rows, where `N` is its column count.
    pub fn from_coefficients(lag: usize, coefficients: DMatrix<f64>) -> Result<Self> {
        let n_vars = coefficients.ncols();
        if lag == 0 || n_vars == 0 {
            return Err(ForecastError::InvalidParameter(
                "VAR needs at least one variable and lag order >= 1".into(),
            ));
        }
        if coefficients.nrows() != 1 + n_vars * lag {
            return Err(ForecastError::DimensionMismatch {
                expected: 1 + n_vars * lag,
                got: coefficients.nrows(),
            });
        }
        Ok(Self {
            lag,
            n_vars,
            coefficients: Some(coefficients),
            fit_method: None,
        })
    }

    /// Create a model from an intercept and lag matrices `A_1..A_p`.
    ///
    /// `A_l[(i, j)]` is the effect of variable `j` at lag `l` on variable `i`.
    pub fn from_parameters(intercept: &[f64], lag_matrices: &[DMatrix<f64>]) -> Result<Self> {
        let n = intercept.len();
        let p = lag_matrices.len();
        if n == 0 || p == 0 {
            return Err(ForecastError::InvalidParameter(
                "VAR needs at least one variable and lag order >= 1".into(),
            ));
        }

        let mut b = DMatrix::zeros(1 + n * p, n);
        for (i, &c) in intercept.iter().enumerate() {
            b[(0, i)] = c;
        }
        for (l, a) in lag_matrices.iter().enumerate() {
            if a.shape() != (n, n) {
                return Err(ForecastError::DimensionMismatch {
                    expected: n,
                    got: a.nrows().max(a.ncols()),
                });
            }
            for i in 0..n {
                for j in 0..n {
                    b[(1 + l * n + j, i)] = a[(i, j)];
                }
            }
        }
        Self::from_coefficients(p, b)
    }

    /// Lag order (p).
    pub fn lag(&self) -> usize {
        self.lag
    }

    /// Number of variables (N).
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    /// Number of regressors per equation (1 + N·p).
    pub fn num_regressors(&self) -> usize {
        1 + self.n_vars * self.lag
    }

    /// Coefficient matrix `B`, if fitted.
    pub fn coefficients(&self) -> Option<&DMatrix<f64>> {
        self.coefficients.as_ref()
    }

    /// Decomposition used by the last fit (None for models built from
    /// known coefficients).
    pub fn fit_method(&self) -> Option<SolveMethod> {
        self.fit_method
    }

    /// Intercept of each equation, if fitted.
    pub fn intercept(&self) -> Option<Vec<f64>> {
        self.coefficients
            .as_ref()
            .map(|b| b.row(0).iter().copied().collect())
    }

    /// Lag matrix `A_l` (1-based), if fitted and `l` is within the order.
    pub fn lag_coefficients(&self, l: usize) -> Option<DMatrix<f64>> {
        if l == 0 || l > self.lag {
            return None;
        }
        let b = self.coefficients.as_ref()?;
        let n = self.n_vars;
        Some(DMatrix::from_fn(n, n, |i, j| b[(1 + (l - 1) * n + j, i)]))
    }

    /// Fit the model by multivariate least squares.
    ///
    /// Uses design rows `[1, y_{t-1}, ..., y_{t-p}]` for `t = p..T-1` with
    /// targets `y_t`; all N equations are solved at once. Refitting
    /// overwrites any previous coefficients.
    pub fn fit(&mut self, train: &Table) -> Result<()> {
        if self.lag == 0 || self.n_vars == 0 {
            return Err(ForecastError::InvalidParameter(
                "VAR needs at least one variable and lag order >= 1".into(),
            ));
        }
        self.check_width(train)?;

        let t_len = train.len();
        if t_len <= self.lag {
            return Err(ForecastError::InsufficientData {
                needed: self.lag + 1,
                got: t_len,
            });
        }

        let rows = t_len - self.lag;
        let k = self.num_regressors();
        let data = train.rows();

        let mut x = DMatrix::zeros(rows, k);
        let mut y = DMatrix::zeros(rows, self.n_vars);
        for t in self.lag..t_len {
            let r = t - self.lag;
            let regressors = self.regressors(&data[..t]);
            for (c, v) in regressors.iter().enumerate() {
                x[(r, c)] = *v;
            }
            for (j, v) in data[t].iter().enumerate() {
                y[(r, j)] = *v;
            }
        }

        let solution = solve_least_squares(&x, &y)?;
        debug!(
            lag = self.lag,
            rows,
            regressors = k,
            method = ?solution.method,
            "fitted VAR"
        );
        self.coefficients = Some(solution.coefficients);
        self.fit_method = Some(solution.method);
        Ok(())
    }

    /// One-step-ahead fitting errors for rows `p..T-1` of `train`.
    pub fn residuals(&self, train: &Table) -> Result<Table> {
        self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        self.check_width(train)?;
        if train.len() <= self.lag {
            return Err(ForecastError::InsufficientData {
                needed: self.lag + 1,
                got: train.len(),
            });
        }

        let data = train.rows();
        let errors = (self.lag..train.len())
            .map(|t| {
                let predicted = self.predict_next(&data[..t])?;
                Ok(data[t]
                    .iter()
                    .zip(predicted.iter())
                    .map(|(a, p)| a - p)
                    .collect())
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;

        Table::from_parts(errors, None, self.n_vars)
    }

    /// Predict the row following `history`.
    ///
    /// `history` is in chronological order; its last `p` rows are used, the
    /// final row being lag 1.
    pub fn predict_next(&self, history: &[Vec<f64>]) -> Result<Vec<f64>> {
        let b = self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        if history.len() < self.lag {
            return Err(ForecastError::InsufficientData {
                needed: self.lag,
                got: history.len(),
            });
        }
        if let Some(row) = history.iter().find(|r| r.len() != self.n_vars) {
            return Err(ForecastError::DimensionMismatch {
                expected: self.n_vars,
                got: row.len(),
            });
        }

        let x = DVector::from_vec(self.regressors(history));
        Ok(b.tr_mul(&x).iter().copied().collect())
    }

    /// Recursive multi-step forecast from the end of `train`.
    ///
    /// Keeps a window of the last `p` observed rows. Each step predicts the
    /// next row from the window, records it, then drops the window's oldest
    /// row and appends the prediction, so later steps are built on earlier
    /// predictions.
    ///
    /// # Returns
    /// A `horizon × N` table of predictions (empty for horizon 0).
    pub fn forecast_recursive(&self, train: &Table, horizon: usize) -> Result<Table> {
        self.coefficients.as_ref().ok_or(ForecastError::FitRequired)?;
        self.check_width(train)?;
        if train.len() < self.lag {
            return Err(ForecastError::InsufficientData {
                needed: self.lag,
                got: train.len(),
            });
        }

        let mut window: VecDeque<Vec<f64>> = train.tail(self.lag).iter().cloned().collect();
        let mut predictions = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let next = self.predict_next(window.make_contiguous())?;
            window.pop_front();
            window.push_back(next.clone());
            predictions.push(next);
        }

        Table::from_parts(predictions, None, self.n_vars)
    }

    /// Regressor vector `[1, y_{t-1}, ..., y_{t-p}]` from chronological history.
    fn regressors(&self, history: &[Vec<f64>]) -> Vec<f64> {
        let mut x = Vec::with_capacity(self.num_regressors());
        x.push(1.0);
        for l in 1..=self.lag {
            x.extend_from_slice(&history[history.len() - l]);
        }
        x
    }

    fn check_width(&self, table: &Table) -> Result<()> {
        if table.width() != self.n_vars {
            return Err(ForecastError::DimensionMismatch {
                expected: self.n_vars,
                got: table.width(),
            });
        }
        Ok(())
    }
}

impl Forecaster for VAR {
    fn fit(&mut self, train: &Table) -> Result<()> {
        VAR::fit(self, train)
    }

    fn residuals(&self, train: &Table) -> Result<Table> {
        VAR::residuals(self, train)
    }

    fn forecast(&self, history: &Table, horizon: usize) -> Result<Table> {
        self.forecast_recursive(history, horizon)
    }

    fn name(&self) -> &str {
        "VAR"
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
