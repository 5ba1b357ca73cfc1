//! Statistical validation tests for time series.
//!
//! # Example
//!
//! ```
//! use qos_forecast::validation::adf_test;
//!
//! // Short series cannot be tested and report p = 1.
//! let short = vec![1.0, 1.2, 0.9];
//! let result = adf_test(&short, 1);
//! assert_eq!(result.p_value, 1.0);
//! assert!(!result.is_stationary);
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_test, CriticalValues, StationarityResult, ADF_MIN_OBSERVATIONS, DEFAULT_SIGNIFICANCE,
};
