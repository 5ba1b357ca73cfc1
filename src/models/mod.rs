//! Forecasting models.

mod traits;

pub mod var;

pub use traits::{BoxedForecaster, Forecaster};
pub use var::VAR;
