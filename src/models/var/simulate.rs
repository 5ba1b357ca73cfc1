//! Simulation of VAR processes with Gaussian innovations.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use crate::models::var::model::VAR;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;

/// Draw `length` rows from a VAR process with known coefficients.
///
/// The process starts from `p` zero rows and runs `burn_in` steps before
/// any row is kept. Each step adds independent N(0, `noise_std`²) noise to
/// every variable. The same `seed` always produces the same table.
///
/// # Arguments
/// * `model` - Model with coefficients (fitted or built from parameters)
/// * `length` - Number of rows to return
/// * `burn_in` - Number of initial steps to discard
/// * `noise_std` - Innovation standard deviation (0 gives a deterministic path)
/// * `seed` - RNG seed
pub fn simulate(
    model: &VAR,
    length: usize,
    burn_in: usize,
    noise_std: f64,
    seed: u64,
) -> Result<Table> {
    if model.coefficients().is_none() {
        return Err(ForecastError::FitRequired);
    }
    let noise = Normal::new(0.0, noise_std).map_err(|_| {
        ForecastError::InvalidParameter(format!(
            "noise_std must be finite and non-negative, got {noise_std}"
        ))
    })?;

    let n = model.n_vars();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut window: VecDeque<Vec<f64>> = (0..model.lag()).map(|_| vec![0.0; n]).collect();
    let mut rows = Vec::with_capacity(length);

    for step in 0..burn_in + length {
        let mut next = model.predict_next(window.make_contiguous())?;
        for v in next.iter_mut() {
            *v += noise.sample(&mut rng);
        }
        window.pop_front();
        window.push_back(next.clone());
        if step >= burn_in {
            rows.push(next);
        }
    }

    Table::from_parts(rows, None, n)
}
