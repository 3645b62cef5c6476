use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info;

use crate::analysis::{
    assemble_table, project_demand, project_unfitted, select_model, simulated_population,
    MIN_OBSERVATIONS,
};
use crate::error::DemandError;
use crate::models::{
    DemandProjection, DemandTable, DemandVector, DemandWarning, DevelopedCells, PopulationTable,
    RegressionMethod, Selection, SubregionId,
};

/// Everything produced by one demand run.
///
/// Subregions where no method could be fitted have a zero projection with a
/// warning and no entry in `selections`.
#[derive(Debug, Clone)]
pub struct DemandRun {
    pub selections: BTreeMap<SubregionId, Selection>,
    pub projections: BTreeMap<SubregionId, DemandProjection>,
    pub table: DemandTable,
}

impl DemandRun {
    /// All data-quality warnings, ordered by subregion.
    pub fn warnings(&self) -> Vec<&DemandWarning> {
        self.projections
            .values()
            .flat_map(|p| p.warnings.iter())
            .collect()
    }

    pub fn demand(&self, subregion: &str) -> Option<&DemandVector> {
        self.projections.get(subregion).map(|p| &p.vector)
    }
}

/// Runs the demand pipeline over a set of input tables.
///
/// Inputs are borrowed and never modified; each subregion is processed by a
/// pure function, so subregions run in parallel.
pub struct DemandEngine<'a> {
    developed: &'a DevelopedCells,
    observed: &'a PopulationTable,
    projected: &'a PopulationTable,
}

impl<'a> DemandEngine<'a> {
    pub fn new(
        developed: &'a DevelopedCells,
        observed: &'a PopulationTable,
        projected: &'a PopulationTable,
    ) -> Self {
        Self {
            developed,
            observed,
            projected,
        }
    }

    /// Check every precondition of a run. Nothing is fitted if this fails.
    pub fn validate(
        &self,
        simulation_times: &[f64],
        methods: &[RegressionMethod],
    ) -> Result<(), DemandError> {
        validate_simulation_times(simulation_times)?;
        if methods.is_empty() {
            return Err(DemandError::ValidationError(
                "At least one regression method is required".to_string(),
            ));
        }

        let observed_times = self.observed.times().len();
        if observed_times < MIN_OBSERVATIONS {
            return Err(DemandError::InsufficientData(format!(
                "Observed population has {observed_times} times, at least {MIN_OBSERVATIONS} are needed to fit a curve"
            )));
        }
        if self.developed.is_empty() {
            return Err(DemandError::InsufficientData(
                "No subregions with developed-cell counts".to_string(),
            ));
        }

        for (subregion, counts) in self.developed.iter() {
            if counts.len() != observed_times {
                return Err(DemandError::CountMismatch(format!(
                    "Subregion {subregion} has {} developed-cell counts but there are {observed_times} observed times",
                    counts.len()
                )));
            }
            if !self.observed.contains(subregion) {
                return Err(DemandError::missing(subregion, "observed population"));
            }
            if !self.projected.contains(subregion) {
                return Err(DemandError::missing(subregion, "projected population"));
            }
        }
        Ok(())
    }

    /// Interpolated population of one subregion at each simulation time.
    pub fn population_at(
        &self,
        subregion: &str,
        simulation_times: &[f64],
    ) -> Result<Vec<f64>, DemandError> {
        let observed = self
            .observed
            .time_series(subregion)
            .ok_or_else(|| DemandError::missing(subregion, "observed population"))?;
        let projected = self
            .projected
            .time_series(subregion)
            .ok_or_else(|| DemandError::missing(subregion, "projected population"))?;
        simulated_population(&observed, &projected, simulation_times)
    }

    /// Interpolate, select and project a single subregion.
    pub fn project_subregion(
        &self,
        subregion: &str,
        simulation_times: &[f64],
        methods: &[RegressionMethod],
    ) -> Result<(Selection, DemandProjection), DemandError> {
        let developed: Vec<f64> = self
            .developed
            .get(subregion)
            .ok_or_else(|| DemandError::missing(subregion, "developed cells"))?
            .iter()
            .map(|&c| c as f64)
            .collect();
        let population = self
            .observed
            .series(subregion)
            .ok_or_else(|| DemandError::missing(subregion, "observed population"))?;
        let simulated = self.population_at(subregion, simulation_times)?;

        let selection = select_model(subregion, population, &developed, &simulated, methods)?;
        let projection = project_demand(&selection);
        Ok((selection, projection))
    }

    /// Validate, then project every subregion and assemble the demand table.
    pub fn run(
        &self,
        simulation_times: &[f64],
        methods: &[RegressionMethod],
    ) -> Result<DemandRun, DemandError> {
        self.validate(simulation_times, methods)?;
        info!(
            subregions = self.developed.len(),
            steps = simulation_times.len(),
            "projecting demand"
        );

        let ids: Vec<&SubregionId> = self.developed.subregions().collect();
        let results: Vec<_> = ids
            .par_iter()
            .map(|id| (*id, self.project_subregion(id, simulation_times, methods)))
            .collect();

        let intervals = simulation_times.len() - 1;
        let mut selections = BTreeMap::new();
        let mut projections = BTreeMap::new();
        for (id, result) in results {
            match result {
                Ok((selection, projection)) => {
                    projections.insert(id.clone(), projection);
                    selections.insert(id.clone(), selection);
                }
                Err(DemandError::NoViableModel(reason)) => {
                    projections.insert(id.clone(), project_unfitted(id, intervals, reason));
                }
                Err(e) => return Err(e),
            }
        }

        let vectors: BTreeMap<SubregionId, DemandVector> = projections
            .iter()
            .map(|(id, p)| (id.clone(), p.vector.clone()))
            .collect();
        let table = assemble_table(self.observed.header(), simulation_times, &vectors)?;

        Ok(DemandRun {
            selections,
            projections,
            table,
        })
    }
}

/// Simulation times must be finite, strictly increasing and at least two long.
pub fn validate_simulation_times(simulation_times: &[f64]) -> Result<(), DemandError> {
    if simulation_times.len() < 2 {
        return Err(DemandError::ValidationError(format!(
            "Need a reference time and at least one simulation time, got {}",
            simulation_times.len()
        )));
    }
    if simulation_times.iter().any(|t| !t.is_finite()) {
        return Err(DemandError::ValidationError(
            "Simulation times must be finite".to_string(),
        ));
    }
    if simulation_times.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DemandError::ValidationError(
            "Simulation times must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}
