//! Data transformations for multivariate tables.
//!
//! Provides single-column differencing and z-score normalization.
//!
//! # Example
//!
//! ```
//! use qos_forecast::core::Table;
//! use qos_forecast::transform::{denormalize, difference_column, normalize};
//!
//! let table = Table::new(vec![
//!     vec![1.0, 10.0],
//!     vec![3.0, 12.0],
//!     vec![6.0, 11.0],
//! ]).unwrap();
//!
//! // Difference the first variable only
//! let diffed = difference_column(&table, 0).unwrap();
//! assert_eq!(diffed.rows(), &[vec![2.0, 12.0], vec![3.0, 11.0]]);
//!
//! // Z-score and back
//! let (scaled, params) = normalize(&diffed).unwrap();
//! let restored = denormalize(&scaled, &params).unwrap();
//! assert_eq!(restored.len(), 2);
//! ```

pub mod diff;
pub mod scale;

pub use diff::{difference, difference_column};
pub use scale::{denormalize, normalize, ColumnScale, NormalizationParams};
