use serde::{Deserialize, Serialize};

use super::{RegressionMethod, SubregionId};

/// One fitted curve for one subregion and method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFit {
    pub method: RegressionMethod,
    /// `m` in `y' = m x' + c`
    pub slope: f64,
    /// `c` in `y' = m x' + c`
    pub intercept: f64,
    /// Root-mean-square residual on the developed-cell scale, `n - 2` degrees of freedom
    pub rmse: f64,
    /// Coefficient of determination on the developed-cell scale
    pub r_squared: f64,
    pub observations: usize,
}

impl CurveFit {
    /// Evaluate the fitted curve at a population value.
    pub fn predict(&self, population: f64) -> f64 {
        self.method.predict(self.slope, self.intercept, population)
    }

    pub fn equation(&self) -> String {
        self.method.equation(self.slope, self.intercept)
    }
}

/// A method that was requested but could not be used for a subregion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMethod {
    pub method: RegressionMethod,
    pub reason: String,
}

/// Result of model selection for one subregion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub subregion: SubregionId,
    /// Minimum-RMSE fit
    pub best: CurveFit,
    /// Every successful fit, in preference order
    pub candidates: Vec<CurveFit>,
    pub skipped: Vec<SkippedMethod>,
    /// Observed population used as predictor
    pub observed_population: Vec<f64>,
    /// Observed developed cells used as response
    pub observed_developed: Vec<f64>,
    /// Interpolated population at every simulation time
    pub simulated_population: Vec<f64>,
    /// Best curve evaluated at `simulated_population`
    pub predicted: Vec<f64>,
}

impl Selection {
    pub fn method(&self) -> RegressionMethod {
        self.best.method
    }

    pub fn rmse(&self) -> f64 {
        self.best.rmse
    }
}
