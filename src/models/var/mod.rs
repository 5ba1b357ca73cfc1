//! Vector autoregression: estimation, lag order selection and simulation.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use qos_forecast::models::var::{select_order, simulate, InformationCriterion, VAR};
//!
//! let a = DMatrix::from_row_slice(2, 2, &[0.5, 0.1, 0.0, 0.4]);
//! let truth = VAR::from_parameters(&[0.0, 0.0], &[a]).unwrap();
//! let train = simulate(&truth, 200, 50, 1.0, 7).unwrap();
//!
//! let selection = select_order(&train, 4, InformationCriterion::Bic).unwrap();
//! let forecast = selection.model.forecast_recursive(&train, 5).unwrap();
//! assert_eq!(forecast.len(), 5);
//! ```

mod model;
mod selection;
mod simulate;

pub use model::VAR;
pub use selection::{
    information_criteria, max_candidate_lag, select_order, InformationCriterion, OrderScore,
    OrderSelection,
};
pub use simulate::simulate;
