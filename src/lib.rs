//! # qos-forecast
//!
//! Multivariate forecasting of network Quality-of-Service metrics with
//! vector autoregression.
//!
//! The pipeline makes each metric stationary with the Augmented
//! Dickey-Fuller test and differencing, z-scores the table, selects the VAR
//! lag order by AIC or BIC, forecasts the held-out rows recursively and
//! reports MAE, RMSE and MAPE per metric.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use qos_forecast::models::var::{simulate, VAR};
//! use qos_forecast::pipeline::{run, PipelineConfig};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[0.5, 0.2, -0.1, 0.4]);
//! let truth = VAR::from_parameters(&[1.0, 2.0], &[a]).unwrap();
//! let table = simulate(&truth, 150, 50, 0.5, 3).unwrap();
//!
//! let config = PipelineConfig::default()
//!     .with_variables(vec!["RTT".into(), "JIT".into()])
//!     .with_max_lag(4);
//! let report = run(&table, &config).unwrap();
//! assert_eq!(report.metrics.len(), 2);
//! assert_eq!(report.forecasts.len(), report.test_size);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::Table;
    pub use crate::error::{ForecastError, Result};
    pub use crate::io::{read_table, write_predictions, RowPolicy};
    pub use crate::models::var::{select_order, InformationCriterion, VAR};
    pub use crate::models::Forecaster;
    pub use crate::pipeline::{run, PipelineConfig, PipelineReport};
    pub use crate::utils::{calculate_metrics, SeriesMetrics};
}
