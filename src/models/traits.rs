//! Forecaster trait defining the common interface for multivariate models.

use crate::core::Table;
use crate::error::Result;

/// Common interface for multivariate forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the training table.
    fn fit(&mut self, train: &Table) -> Result<()>;

    /// In-sample one-step-ahead errors on `train`.
    fn residuals(&self, train: &Table) -> Result<Table>;

    /// Forecast `horizon` rows following the end of `history`.
    fn forecast(&self, history: &Table, horizon: usize) -> Result<Table>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use qos_forecast::models::var::VAR;
/// use qos_forecast::models::{BoxedForecaster, Forecaster};
///
/// let model: BoxedForecaster = Box::new(VAR::new(6, 2));
/// assert_eq!(model.name(), "VAR");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;
