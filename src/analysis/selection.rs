//! Per-subregion model selection.
//!
//! Every requested method is fitted independently; the one with the lowest
//! RMSE wins. Methods are tried in the fixed order linear, logarithmic,
//! exponential and a later method must be strictly better to replace an
//! earlier one, so ties always resolve the same way.

use tracing::{debug, warn};

use crate::analysis::regression::{fit_curve, MIN_OBSERVATIONS};
use crate::error::DemandError;
use crate::models::{CurveFit, RegressionMethod, Selection, SkippedMethod};

/// Fit every method for one subregion and keep the minimum-RMSE curve.
///
/// `population` and `developed` are the paired observations; the selected
/// curve is then evaluated at `simulated_population` (one value per simulation
/// time). A method whose transform is undefined on the data, or whose curve is
/// not finite at the simulation times, is skipped with a warning.
///
/// # Errors
///
/// - `InsufficientData` if fewer than three observations are available
/// - `NoViableModel` if every requested method was skipped
pub fn select_model(
    subregion: &str,
    population: &[f64],
    developed: &[f64],
    simulated_population: &[f64],
    methods: &[RegressionMethod],
) -> Result<Selection, DemandError> {
    if population.len() < MIN_OBSERVATIONS {
        return Err(DemandError::InsufficientData(format!(
            "Subregion {subregion} has {} observations, at least {MIN_OBSERVATIONS} are needed",
            population.len()
        )));
    }

    let mut candidates: Vec<CurveFit> = Vec::new();
    let mut skipped: Vec<SkippedMethod> = Vec::new();

    for method in RegressionMethod::canonicalize(methods) {
        let fit = match fit_curve(method, population, developed) {
            Ok(fit) => fit,
            Err(DemandError::UndefinedTransform(reason)) => {
                warn!(subregion, %method, "skipping method: {reason}");
                skipped.push(SkippedMethod { method, reason });
                continue;
            }
            Err(e) => return Err(e),
        };

        if simulated_population
            .iter()
            .any(|&p| !fit.predict(p).is_finite())
        {
            let reason = format!("{method} curve is not finite at the simulated population");
            warn!(subregion, %method, "skipping method: {reason}");
            skipped.push(SkippedMethod { method, reason });
            continue;
        }

        debug!(
            subregion,
            %method,
            slope = fit.slope,
            intercept = fit.intercept,
            rmse = fit.rmse,
            "fitted"
        );
        candidates.push(fit);
    }

    let best = pick_lowest_rmse(&candidates).cloned().ok_or_else(|| {
        let reasons: Vec<&str> = skipped.iter().map(|s| s.reason.as_str()).collect();
        DemandError::NoViableModel(format!(
            "No requested regression method could be fitted for subregion {subregion} ({})",
            reasons.join("; ")
        ))
    })?;

    let predicted = simulated_population
        .iter()
        .map(|&p| best.predict(p))
        .collect();

    Ok(Selection {
        subregion: subregion.to_string(),
        best,
        candidates,
        skipped,
        observed_population: population.to_vec(),
        observed_developed: developed.to_vec(),
        simulated_population: simulated_population.to_vec(),
        predicted,
    })
}

/// First candidate with the strictly lowest RMSE.
fn pick_lowest_rmse(candidates: &[CurveFit]) -> Option<&CurveFit> {
    let mut best: Option<&CurveFit> = None;
    for fit in candidates {
        match best {
            Some(current) if fit.rmse >= current.rmse => {}
            _ => best = Some(fit),
        }
    }
    best
}
