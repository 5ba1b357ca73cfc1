//! Least-squares and small dense linear algebra helpers.
//!
//! Regressions are solved through the normal equations `X'X β = X'Y`. The
//! LU route is tried first; when `X'X` is singular or badly conditioned the
//! solve falls back to an SVD least-squares (minimum-norm) solution, so short
//! training windows with more regressors than the data can pin down still
//! produce coefficients instead of an error.

use crate::core::Table;
use crate::error::{ForecastError, Result};
use nalgebra::DMatrix;
use tracing::debug;

/// Pivots smaller than this fraction of the largest pivot mark `X'X` singular.
const PIVOT_TOLERANCE: f64 = 1e-11;

/// Singular values below this fraction of the largest are treated as zero.
const SVD_RCOND: f64 = 1e-12;

/// Floor applied to non-positive or non-finite determinants.
pub const DETERMINANT_FLOOR: f64 = 1e-12;

/// Decomposition used to produce a least-squares solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    /// LU decomposition of a non-singular `X'X`.
    Lu,
    /// SVD pseudo-inverse fallback for a singular `X'X`.
    Svd,
}

/// Solution of a least-squares problem.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Coefficients, one column per target column.
    pub coefficients: DMatrix<f64>,
    /// Decomposition that produced the coefficients.
    pub method: SolveMethod,
}

/// Solve `min ||X β - Y||` through the normal equations.
///
/// # Arguments
/// * `x` - Design matrix (rows = observations, columns = regressors)
/// * `y` - Targets (rows = observations, columns = target variables)
///
/// # Returns
/// Coefficient matrix of shape `x.ncols() × y.ncols()`.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Result<LeastSquares> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ForecastError::EmptyData);
    }
    if x.nrows() != y.nrows() {
        return Err(ForecastError::DimensionMismatch {
            expected: x.nrows(),
            got: y.nrows(),
        });
    }

    let xt = x.transpose();
    let xtx = &xt * x;
    let xty = &xt * y;

    if let Some(coefficients) = lu_solve(&xtx, &xty) {
        return Ok(LeastSquares {
            coefficients,
            method: SolveMethod::Lu,
        });
    }

    debug!(
        regressors = xtx.nrows(),
        rows = x.nrows(),
        "normal equations singular, falling back to SVD"
    );
    let coefficients = svd_solve(xtx, &xty)?;
    Ok(LeastSquares {
        coefficients,
        method: SolveMethod::Svd,
    })
}

/// Invert a square matrix, falling back to the pseudo-inverse when singular.
pub fn inverse(m: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if !m.is_square() {
        return Err(ForecastError::DimensionMismatch {
            expected: m.nrows(),
            got: m.ncols(),
        });
    }

    let lu = m.clone().lu();
    if pivots_well_conditioned(&lu.u()) {
        if let Some(inv) = lu.try_inverse() {
            if inv.iter().all(|v| v.is_finite()) {
                return Ok(inv);
            }
        }
    }

    let eps = rcond_threshold(m);
    m.clone()
        .pseudo_inverse(eps)
        .map_err(|e| ForecastError::ComputationError(e.to_string()))
}

/// Natural log of the determinant, floored at `ln(DETERMINANT_FLOOR)`.
///
/// Non-square input, non-positive, NaN or infinite determinants all map to
/// the floor so that information criteria stay finite.
pub fn log_determinant(m: &DMatrix<f64>) -> f64 {
    if !m.is_square() || m.nrows() == 0 {
        return DETERMINANT_FLOOR.ln();
    }
    let det = m.clone().lu().determinant();
    if !det.is_finite() || det <= 0.0 {
        DETERMINANT_FLOOR.ln()
    } else {
        det.ln()
    }
}

/// Biased (divide-by-L) sample covariance of the rows of a table.
pub fn covariance(table: &Table) -> DMatrix<f64> {
    let n = table.width();
    let l = table.len();
    let mut cov = DMatrix::zeros(n, n);
    if l == 0 {
        return cov;
    }

    let mut mean = vec![0.0; n];
    for row in table.rows() {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    for m in mean.iter_mut() {
        *m /= l as f64;
    }

    for row in table.rows() {
        for i in 0..n {
            let di = row[i] - mean[i];
            for j in 0..n {
                cov[(i, j)] += di * (row[j] - mean[j]);
            }
        }
    }
    cov / l as f64
}

fn lu_solve(xtx: &DMatrix<f64>, xty: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let lu = xtx.clone().lu();
    if !lu.is_invertible() || !pivots_well_conditioned(&lu.u()) {
        return None;
    }
    lu.solve(xty)
        .filter(|beta| beta.iter().all(|v| v.is_finite()))
}

fn svd_solve(xtx: DMatrix<f64>, xty: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let eps = rcond_threshold(&xtx);
    let svd = xtx.svd(true, true);
    svd.solve(xty, eps)
        .map_err(|e| ForecastError::ComputationError(e.to_string()))
}

fn pivots_well_conditioned(u: &DMatrix<f64>) -> bool {
    let pivots: Vec<f64> = u.diagonal().iter().map(|v| v.abs()).collect();
    let max = pivots.iter().copied().fold(0.0, f64::max);
    if max == 0.0 || !max.is_finite() {
        return false;
    }
    pivots.iter().all(|&p| p > PIVOT_TOLERANCE * max)
}

fn rcond_threshold(m: &DMatrix<f64>) -> f64 {
    let scale = m.iter().map(|v| v.abs()).fold(0.0, f64::max);
    if scale.is_finite() {
        scale * SVD_RCOND
    } else {
        0.0
    }
}
