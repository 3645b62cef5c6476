use statrs::statistics::Statistics;

use crate::analysis::ols::fit_line;
use crate::error::DemandError;
use crate::models::{CurveFit, RegressionMethod};

/// Fewest observations for which the `n - 2` RMSE is defined.
pub const MIN_OBSERVATIONS: usize = 3;

/// Fit one regression method of developed cells (`y`) against population (`x`).
///
/// The method's transforms are applied, `y' = m x' + c` is solved by least
/// squares, and the RMSE is measured on the untransformed developed-cell
/// scale: `sqrt(Σ (ŷ_i − y_i)² / (n − 2))`.
///
/// # Errors
///
/// - `ValidationError` if the inputs differ in length or are not finite
/// - `InsufficientData` if fewer than [`MIN_OBSERVATIONS`] pairs are given
/// - `UndefinedTransform` if the transform is undefined on the data,
///   e.g. a zero developed count under the exponential method
pub fn fit_curve(method: RegressionMethod, x: &[f64], y: &[f64]) -> Result<CurveFit, DemandError> {
    if x.len() != y.len() {
        return Err(DemandError::ValidationError(format!(
            "{method} regression needs paired observations, got {} predictors and {} responses",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < MIN_OBSERVATIONS {
        return Err(DemandError::InsufficientData(format!(
            "{method} regression needs at least {MIN_OBSERVATIONS} observations, got {n}"
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(DemandError::ValidationError(format!(
            "{method} regression inputs must be finite"
        )));
    }

    let tx: Vec<f64> = x.iter().map(|&v| method.transform_predictor(v)).collect();
    let ty: Vec<f64> = y.iter().map(|&v| method.transform_response(v)).collect();
    if tx.iter().any(|v| !v.is_finite()) {
        return Err(DemandError::UndefinedTransform(format!(
            "{method} regression needs positive population values"
        )));
    }
    if ty.iter().any(|v| !v.is_finite()) {
        return Err(DemandError::UndefinedTransform(format!(
            "{method} regression needs positive developed-cell counts"
        )));
    }

    let (slope, intercept) = fit_line(&tx, &ty).ok_or_else(|| {
        DemandError::UndefinedTransform(format!("{method} least squares has no finite solution"))
    })?;

    let predicted: Vec<f64> = x
        .iter()
        .map(|&v| method.predict(slope, intercept, v))
        .collect();
    let sse: f64 = predicted
        .iter()
        .zip(y)
        .map(|(p, o)| (p - o).powi(2))
        .sum();
    if !sse.is_finite() {
        return Err(DemandError::UndefinedTransform(format!(
            "{method} curve overflows at the observed population"
        )));
    }
    let rmse = (sse / (n - 2) as f64).sqrt();

    Ok(CurveFit {
        method,
        slope,
        intercept,
        rmse,
        r_squared: r_squared(y, sse),
        observations: n,
    })
}

/// `1 − SSE/SST`; zero when the response has no variance.
fn r_squared(y: &[f64], sse: f64) -> f64 {
    let mean = y.iter().mean();
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    if sst <= f64::EPSILON {
        0.0
    } else {
        1.0 - sse / sst
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn population() -> Vec<f64> {
        vec![1000.0, 1500.0, 2000.0, 2600.0, 3100.0]
    }

    #[test]
    fn test_linear_exact_fit() {
        let x = population();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 5.0).collect();
        let fit = fit_curve(RegressionMethod::Linear, &x, &y).unwrap();
        assert_approx_eq!(fit.slope, 2.0, 1e-9);
        assert_approx_eq!(fit.intercept, 5.0, 1e-6);
        assert!(fit.rmse < 1e-6);
        assert_approx_eq!(fit.r_squared, 1.0, 1e-9);
        assert_eq!(fit.observations, 5);
    }

    #[test]
    fn test_logarithmic_exact_fit() {
        let x = population();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v.ln() - 4.0).collect();
        let fit = fit_curve(RegressionMethod::Logarithmic, &x, &y).unwrap();
        assert_approx_eq!(fit.slope, 3.0, 1e-6);
        assert_approx_eq!(fit.intercept, -4.0, 1e-5);
        assert!(fit.rmse < 1e-6);
    }

    #[test]
    fn test_exponential_exact_fit() {
        let x: Vec<f64> = vec![100.0, 200.0, 300.0, 400.0];
        let y: Vec<f64> = x.iter().map(|v| (0.01 * v).exp()).collect();
        let fit = fit_curve(RegressionMethod::Exponential, &x, &y).unwrap();
        assert_approx_eq!(fit.slope, 0.01, 1e-9);
        assert_approx_eq!(fit.intercept, 0.0, 1e-6);
        assert!(fit.rmse < 1e-6);
    }

    #[test]
    fn test_rmse_uses_n_minus_two() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 2.0, 4.0];
        let fit = fit_curve(RegressionMethod::Linear, &x, &y).unwrap();
        let sse: f64 = x
            .iter()
            .zip(&y)
            .map(|(a, b)| (fit.slope * a + fit.intercept - b).powi(2))
            .sum();
        assert_approx_eq!(fit.rmse, (sse / 2.0).sqrt(), 1e-12);
    }

    #[test]
    fn test_rmse_on_original_scale_for_exponential() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 7.0, 20.0, 55.0];
        let fit = fit_curve(RegressionMethod::Exponential, &x, &y).unwrap();
        let sse: f64 = x
            .iter()
            .zip(&y)
            .map(|(a, b)| ((fit.slope * a + fit.intercept).exp() - b).powi(2))
            .sum();
        assert_approx_eq!(fit.rmse, (sse / 2.0).sqrt(), 1e-9);
    }

    #[test]
    fn test_two_observations_is_insufficient() {
        let result = fit_curve(RegressionMethod::Linear, &[1.0, 2.0], &[1.0, 2.0]);
        assert!(matches!(result, Err(DemandError::InsufficientData(_))));
    }

    #[test]
    fn test_length_mismatch() {
        let result = fit_curve(RegressionMethod::Linear, &[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!(matches!(result, Err(DemandError::ValidationError(_))));
    }

    #[test]
    fn test_exponential_with_zero_cells_is_undefined() {
        let result = fit_curve(RegressionMethod::Exponential, &[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0]);
        assert!(matches!(result, Err(DemandError::UndefinedTransform(_))));
    }

    #[test]
    fn test_logarithmic_with_zero_population_is_undefined() {
        let result = fit_curve(RegressionMethod::Logarithmic, &[0.0, 1.0, 2.0], &[1.0, 1.0, 2.0]);
        assert!(matches!(result, Err(DemandError::UndefinedTransform(_))));
    }

    #[test]
    fn test_flat_response_has_zero_r_squared() {
        let fit = fit_curve(RegressionMethod::Linear, &[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(fit.r_squared, 0.0);
        assert!(fit.rmse < 1e-9);
    }

    #[test]
    fn test_negative_trend_has_negative_slope() {
        let fit = fit_curve(
            RegressionMethod::Linear,
            &[1000.0, 1200.0, 1400.0],
            &[100.0, 90.0, 80.0],
        )
        .unwrap();
        assert!(fit.slope < 0.0);
    }
}
