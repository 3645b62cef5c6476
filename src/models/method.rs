use serde::{Deserialize, Serialize};

use crate::error::DemandError;

/// Relationship between developed cells (response) and population (predictor).
///
/// Each method is a transform pair applied before fitting `y' = m x' + c` by
/// ordinary least squares:
///
/// | method      | predictor `x'` | response `y'` | curve                |
/// |-------------|----------------|---------------|----------------------|
/// | linear      | `x`            | `y`           | `y = c + m x`        |
/// | logarithmic | `ln x`         | `y`           | `y = c + m ln(x)`    |
/// | exponential | `x`            | `ln y`        | `y = e^c e^(m x)`    |
///
/// The declaration order is the preference order used to break RMSE ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionMethod {
    Linear,
    Logarithmic,
    Exponential,
}

impl RegressionMethod {
    /// Every method, in preference order.
    pub const ALL: [RegressionMethod; 3] = [
        RegressionMethod::Linear,
        RegressionMethod::Logarithmic,
        RegressionMethod::Exponential,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RegressionMethod::Linear => "linear",
            RegressionMethod::Logarithmic => "logarithmic",
            RegressionMethod::Exponential => "exponential",
        }
    }

    /// Forward transform of the predictor (population).
    pub fn transform_predictor(self, x: f64) -> f64 {
        match self {
            RegressionMethod::Logarithmic => x.ln(),
            RegressionMethod::Linear | RegressionMethod::Exponential => x,
        }
    }

    /// Forward transform of the response (developed cells).
    pub fn transform_response(self, y: f64) -> f64 {
        match self {
            RegressionMethod::Exponential => y.ln(),
            RegressionMethod::Linear | RegressionMethod::Logarithmic => y,
        }
    }

    /// Inverse of [`transform_response`](Self::transform_response).
    pub fn inverse_response(self, y: f64) -> f64 {
        match self {
            RegressionMethod::Exponential => y.exp(),
            RegressionMethod::Linear | RegressionMethod::Logarithmic => y,
        }
    }

    /// Evaluate the fitted curve at `x`, in developed-cell units.
    pub fn predict(self, slope: f64, intercept: f64, x: f64) -> f64 {
        self.inverse_response(slope * self.transform_predictor(x) + intercept)
    }

    /// Human-readable curve equation for labels and reports.
    pub fn equation(self, slope: f64, intercept: f64) -> String {
        match self {
            RegressionMethod::Linear => format!("y = {intercept:.3} + {slope:.3} x"),
            RegressionMethod::Logarithmic => format!("y = {intercept:.3} + {slope:.3} ln(x)"),
            RegressionMethod::Exponential => {
                format!("y = {:.3} e^({slope:.3} x)", intercept.exp())
            }
        }
    }

    /// Sort into preference order and drop duplicates.
    pub fn canonicalize(methods: &[RegressionMethod]) -> Vec<RegressionMethod> {
        let mut methods = methods.to_vec();
        methods.sort();
        methods.dedup();
        methods
    }
}

impl std::fmt::Display for RegressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for RegressionMethod {
    type Err = DemandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" | "lin" => Ok(RegressionMethod::Linear),
            "logarithmic" | "log" => Ok(RegressionMethod::Logarithmic),
            "exponential" | "exp" => Ok(RegressionMethod::Exponential),
            _ => Err(DemandError::ParseError(format!(
                "Unknown regression method: '{s}'. Use: linear, logarithmic, or exponential"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("linear".parse::<RegressionMethod>().unwrap(), RegressionMethod::Linear);
        assert_eq!("LOG".parse::<RegressionMethod>().unwrap(), RegressionMethod::Logarithmic);
        assert_eq!(" exp ".parse::<RegressionMethod>().unwrap(), RegressionMethod::Exponential);
        assert!("quadratic".parse::<RegressionMethod>().is_err());
    }

    #[test]
    fn test_display_matches_name() {
        for method in RegressionMethod::ALL {
            assert_eq!(method.to_string(), method.name());
            assert_eq!(method.name().parse::<RegressionMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_response_transform_inverts() {
        for method in RegressionMethod::ALL {
            let y = 42.5;
            let back = method.inverse_response(method.transform_response(y));
            assert!((back - y).abs() < 1e-9, "{method} does not invert");
        }
    }

    #[test]
    fn test_predict_linear() {
        assert!((RegressionMethod::Linear.predict(2.0, 5.0, 10.0) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_logarithmic() {
        let y = RegressionMethod::Logarithmic.predict(3.0, 1.0, std::f64::consts::E);
        assert!((y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_exponential() {
        let y = RegressionMethod::Exponential.predict(0.5, 0.0, 2.0);
        assert!((y - 1.0f64.exp()).abs() < 1e-12);
    }

    #[test]
    fn test_canonicalize_orders_and_dedups() {
        let methods = RegressionMethod::canonicalize(&[
            RegressionMethod::Exponential,
            RegressionMethod::Linear,
            RegressionMethod::Exponential,
        ]);
        assert_eq!(
            methods,
            vec![RegressionMethod::Linear, RegressionMethod::Exponential]
        );
    }

    #[test]
    fn test_equation_labels() {
        assert_eq!(RegressionMethod::Linear.equation(2.0, 5.0), "y = 5.000 + 2.000 x");
        assert!(RegressionMethod::Logarithmic.equation(1.0, 0.0).contains("ln(x)"));
        assert_eq!(
            RegressionMethod::Exponential.equation(0.01, 0.0),
            "y = 1.000 e^(0.010 x)"
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RegressionMethod::Logarithmic).unwrap();
        assert_eq!(json, "\"logarithmic\"");
        let back: RegressionMethod = serde_json::from_str("\"exponential\"").unwrap();
        assert_eq!(back, RegressionMethod::Exponential);
    }
}
