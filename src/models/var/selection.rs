//! Lag order selection for VAR models by information criteria.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use crate::models::var::model::VAR;
use crate::utils::linalg::{covariance, log_determinant};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Information criterion used to rank candidate lag orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    /// Akaike Information Criterion
    #[default]
    Aic,
    /// Bayesian (Schwarz) Information Criterion
    Bic,
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InformationCriterion::Aic => write!(f, "AIC"),
            InformationCriterion::Bic => write!(f, "BIC"),
        }
    }
}

/// Information criteria of one candidate lag order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderScore {
    /// Lag order
    pub lag: usize,
    /// Akaike Information Criterion
    pub aic: f64,
    /// Bayesian Information Criterion
    pub bic: f64,
}

impl OrderScore {
    /// Value of `criterion` for this order.
    pub fn score(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Bic => self.bic,
        }
    }
}

/// Outcome of a lag order search.
#[derive(Debug, Clone)]
pub struct OrderSelection {
    /// Winning model, fitted on the full training table
    pub model: VAR,
    /// Selected lag order
    pub selected_lag: usize,
    /// Criterion the order was chosen by
    pub criterion: InformationCriterion,
    /// Scores of every candidate, in ascending lag order
    pub scores: Vec<OrderScore>,
}

impl OrderSelection {
    /// Score of the selected order under the selection criterion.
    pub fn best_score(&self) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.lag == self.selected_lag)
            .map(|s| s.score(self.criterion))
    }
}

/// AIC and BIC from the residuals of a VAR(`lag`) fit.
///
/// With Σ̂ the biased residual covariance, L the residual count and N the
/// variable count:
///
/// AIC = ln det Σ̂ + 2·p·N² / L
///
/// BIC = ln det Σ̂ + ln(L)·p·N² / L
pub fn information_criteria(residuals: &Table, lag: usize) -> OrderScore {
    let l = residuals.len() as f64;
    let n = residuals.width() as f64;
    let logdet = log_determinant(&covariance(residuals));
    let k = lag as f64 * n * n;

    OrderScore {
        lag,
        aic: logdet + 2.0 * k / l,
        bic: logdet + l.ln() * k / l,
    }
}

/// Largest lag order that can be fitted on `train_len` rows.
pub fn max_candidate_lag(train_len: usize, max_lag: usize) -> usize {
    max_lag.min(train_len.saturating_sub(1))
}

/// Select the VAR lag order minimizing `criterion`.
///
/// Fits every order p in `1..=min(max_lag, T-1)` and scores its residuals.
/// A later order must be strictly better to win, so ties go to the smaller
/// order. Non-finite scores never win.
///
/// # Arguments
/// * `train` - Training table
/// * `max_lag` - Largest lag order to consider
/// * `criterion` - AIC or BIC
///
/// # Returns
/// The winning model refit on `train`, with every candidate's scores.
pub fn select_order(
    train: &Table,
    max_lag: usize,
    criterion: InformationCriterion,
) -> Result<OrderSelection> {
    if max_lag == 0 {
        return Err(ForecastError::InvalidParameter(
            "max_lag must be at least 1".into(),
        ));
    }

    let upper = max_candidate_lag(train.len(), max_lag);
    if upper == 0 {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: train.len(),
        });
    }

    let mut scores = Vec::with_capacity(upper);
    let mut candidates = Vec::with_capacity(upper);
    for p in 1..=upper {
        let mut model = VAR::new(train.width(), p);
        model.fit(train)?;
        let residuals = model.residuals(train)?;
        let score = information_criteria(&residuals, p);
        info!(lag = p, aic = score.aic, bic = score.bic, "order candidate");
        scores.push(score);
        candidates.push(model);
    }

    let best = pick_best(&scores, criterion).ok_or_else(|| {
        ForecastError::ComputationError(format!(
            "no candidate order produced a finite {criterion}"
        ))
    })?;

    let selected_lag = scores[best].lag;
    let mut model = candidates.swap_remove(best);
    model.fit(train)?;
    debug!(method = ?model.fit_method(), "refit selected order");
    info!(
        lag = selected_lag,
        %criterion,
        score = scores[best].score(criterion),
        "selected VAR order"
    );

    Ok(OrderSelection {
        model,
        selected_lag,
        criterion,
        scores,
    })
}

/// Index of the lowest finite score, earliest on ties.
fn pick_best(scores: &[OrderScore], criterion: InformationCriterion) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in scores.iter().enumerate() {
        let value = s.score(criterion);
        if !value.is_finite() {
            continue;
        }
        match best {
            Some((_, b)) if value >= b => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::var::simulate;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn var1_sample(length: usize, seed: u64) -> Table {
        let a = DMatrix::from_row_slice(2, 2, &[0.5, 0.1, 0.0, 0.4]);
        let model = VAR::from_parameters(&[0.2, -0.1], &[a]).unwrap();
        simulate(&model, length, 100, 1.0, seed).unwrap()
    }

    fn score(lag: usize, aic: f64, bic: f64) -> OrderScore {
        OrderScore { lag, aic, bic }
    }

    #[test]
    fn bic_recovers_var1_order() {
        for seed in 0..5 {
            let train = var1_sample(300, seed);
            let selection = select_order(&train, 6, InformationCriterion::Bic).unwrap();
            assert_eq!(selection.selected_lag, 1, "seed {seed}");
            assert_eq!(selection.model.lag(), 1);
        }
    }

    #[test]
    fn scores_every_candidate_in_order() {
        let train = var1_sample(120, 42);
        let selection = select_order(&train, 5, InformationCriterion::Aic).unwrap();

        let lags: Vec<usize> = selection.scores.iter().map(|s| s.lag).collect();
        assert_eq!(lags, vec![1, 2, 3, 4, 5]);
        assert!(selection.best_score().is_some());
        assert!(selection.model.coefficients().is_some());
    }

    #[test]
    fn candidates_bounded_by_training_length() {
        let train = var1_sample(4, 1);
        let selection = select_order(&train, 12, InformationCriterion::Aic).unwrap();

        assert_eq!(selection.scores.len(), 3);
        assert!(selection.selected_lag <= 3);
    }

    #[test]
    fn single_row_has_no_candidate() {
        let train = var1_sample(1, 1);
        assert!(matches!(
            select_order(&train, 12, InformationCriterion::Aic),
            Err(ForecastError::InsufficientData { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn zero_max_lag_is_invalid() {
        let train = var1_sample(50, 1);
        assert!(matches!(
            select_order(&train, 0, InformationCriterion::Bic),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn ties_go_to_smaller_order() {
        let scores = [score(1, -2.0, 0.0), score(2, -2.0, 0.0), score(3, -1.0, 0.0)];
        assert_eq!(pick_best(&scores, InformationCriterion::Aic), Some(0));
    }

    #[test]
    fn nan_never_wins() {
        let scores = [score(1, f64::NAN, 1.0), score(2, 3.0, f64::NAN), score(3, 4.0, 2.0)];
        assert_eq!(pick_best(&scores, InformationCriterion::Aic), Some(1));
        assert_eq!(pick_best(&scores, InformationCriterion::Bic), Some(0));
        assert_eq!(pick_best(&[score(1, f64::NAN, f64::NAN)], InformationCriterion::Aic), None);
    }

    #[test]
    fn criteria_formula() {
        // Residuals with covariance diag(1, 4): logdet = ln 4
        let residuals = Table::new(vec![
            vec![1.0, 2.0],
            vec![-1.0, -2.0],
            vec![1.0, -2.0],
            vec![-1.0, 2.0],
        ])
        .unwrap();
        let s = information_criteria(&residuals, 2);

        let logdet = 4.0_f64.ln();
        assert_relative_eq!(s.aic, logdet + 2.0 * 8.0 / 4.0, epsilon = 1e-10);
        assert_relative_eq!(s.bic, logdet + 4.0_f64.ln() * 8.0 / 4.0, epsilon = 1e-10);
    }

    #[test]
    fn criterion_serde_names() {
        let json = serde_json::to_string(&InformationCriterion::Bic).unwrap();
        assert_eq!(json, "\"bic\"");
        let parsed: InformationCriterion = serde_json::from_str("\"aic\"").unwrap();
        assert_eq!(parsed, InformationCriterion::Aic);
        assert_eq!(InformationCriterion::Bic.to_string(), "BIC");
    }
}
