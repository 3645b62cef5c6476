//! Ordinary least squares for the two-column design `[x, 1]`.
//!
//! The system is solved through an SVD so that a rank-deficient design (for
//! example a subregion whose population never changed) still yields the
//! minimum-norm solution instead of failing. Singular values below
//! `max(σ) · max(rows, cols) · ε` are treated as zero, the same cutoff
//! `lstsq` uses by default.

use nalgebra::{DMatrix, DVector};

/// Solve `min ‖X β − y‖²` for the minimum-norm `β`.
///
/// Returns `None` if the solution is not finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.iter().copied().fold(0.0f64, f64::max);
    let tol = max_sv * x.nrows().max(x.ncols()) as f64 * f64::EPSILON;

    let beta = svd.solve(y, tol).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Fit `y = m x + c` and return `(m, c)`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    debug_assert_eq!(x.len(), y.len());
    let design = DMatrix::from_fn(x.len(), 2, |r, c| if c == 0 { x[r] } else { 1.0 });
    let response = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &response)?;
    Some((beta[0], beta[1]))
}
