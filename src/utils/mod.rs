//! Utility functions shared by the forecasting pipeline.

pub mod linalg;
pub mod metrics;

pub use linalg::{
    covariance, inverse, log_determinant, solve_least_squares, LeastSquares, SolveMethod,
};
pub use metrics::{calculate_metrics, evaluate, SeriesMetrics};
