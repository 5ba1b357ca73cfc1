//! Core data structures for multivariate forecasting.

mod table;

pub use table::Table;
