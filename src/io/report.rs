use std::path::Path;

use serde::Serialize;

use crate::analysis::DemandRun;
use crate::error::DemandError;
use crate::models::{CurveFit, RegressionMethod, SkippedMethod};

/// Fit diagnostics of one subregion, as exported to JSON.
#[derive(Debug, Serialize)]
pub struct SubregionReport<'a> {
    pub subregion: &'a str,
    pub method: RegressionMethod,
    pub equation: String,
    pub slope: f64,
    pub intercept: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub candidates: &'a [CurveFit],
    pub skipped: &'a [SkippedMethod],
    pub simulated_population: &'a [f64],
    pub predicted: &'a [f64],
    pub demand: &'a [u64],
    pub warnings: Vec<String>,
}

/// Whole-run fit report.
#[derive(Debug, Serialize)]
pub struct FitReport<'a> {
    pub steps: usize,
    pub times: &'a [i64],
    pub subregions: Vec<SubregionReport<'a>>,
}

impl<'a> FitReport<'a> {
    pub fn from_run(run: &'a DemandRun) -> Self {
        let subregions = run
            .selections
            .iter()
            .map(|(id, sel)| {
                let projection = run.projections.get(id);
                SubregionReport {
                    subregion: id,
                    method: sel.best.method,
                    equation: sel.best.equation(),
                    slope: sel.best.slope,
                    intercept: sel.best.intercept,
                    rmse: sel.best.rmse,
                    r_squared: sel.best.r_squared,
                    candidates: &sel.candidates,
                    skipped: &sel.skipped,
                    simulated_population: &sel.simulated_population,
                    predicted: &sel.predicted,
                    demand: projection.map_or(&[][..], |p| p.vector.cells.as_slice()),
                    warnings: projection
                        .map(|p| p.warnings.iter().map(ToString::to_string).collect())
                        .unwrap_or_default(),
                }
            })
            .collect();

        Self {
            steps: run.table.steps,
            times: &run.table.times,
            subregions,
        }
    }
}

/// Serialize the fit report of a run.
pub fn report_json(run: &DemandRun, pretty: bool) -> Result<String, DemandError> {
    let report = FitReport::from_run(run);
    let content = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(content)
}

/// Write the fit report of a run to a JSON file.
pub fn write_report(run: &DemandRun, path: impl AsRef<Path>, pretty: bool) -> Result<(), DemandError> {
    std::fs::write(path.as_ref(), report_json(run, pretty)?)?;
    Ok(())
}
