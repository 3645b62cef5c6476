use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::validate_simulation_times;
use crate::error::DemandError;
use crate::io::parse_separator;
use crate::models::RegressionMethod;

/// Run settings for a demand projection, loadable from TOML.
///
/// ```toml
/// methods = ["linear", "logarithmic"]
/// simulation_times = [2010, 2015, 2020, 2025, 2030]
/// separator = "comma"
/// plot = "fits.txt"
/// report = "fits.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    pub methods: Vec<RegressionMethod>,
    pub simulation_times: Vec<f64>,
    /// Field separator of the population and developed-cell tables
    pub separator: String,
    /// Optional text report of per-subregion fit charts
    pub plot: Option<PathBuf>,
    /// Optional JSON fit report
    pub report: Option<PathBuf>,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            methods: vec![RegressionMethod::Linear, RegressionMethod::Logarithmic],
            simulation_times: Vec::new(),
            separator: "comma".to_string(),
            plot: None,
            report: None,
        }
    }
}

impl DemandConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, DemandError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DemandError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn separator_byte(&self) -> Result<u8, DemandError> {
        parse_separator(&self.separator)
    }

    /// Check the settings a run depends on.
    pub fn validate(&self) -> Result<(), DemandError> {
        if self.methods.is_empty() {
            return Err(DemandError::ValidationError(
                "At least one regression method is required".to_string(),
            ));
        }
        validate_simulation_times(&self.simulation_times)?;
        self.separator_byte()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemandConfig::default();
        assert_eq!(
            config.methods,
            vec![RegressionMethod::Linear, RegressionMethod::Logarithmic]
        );
        assert_eq!(config.separator_byte().unwrap(), b',');
        assert!(config.plot.is_none());
    }

    #[test]
    fn test_parse_full_file() {
        let config = DemandConfig::from_toml_str(
            r#"
            methods = ["exponential", "linear"]
            simulation_times = [2010, 2020.0, 2030]
            separator = "pipe"
            plot = "plot.txt"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.methods,
            vec![RegressionMethod::Exponential, RegressionMethod::Linear]
        );
        assert_eq!(config.simulation_times, vec![2010.0, 2020.0, 2030.0]);
        assert_eq!(config.separator_byte().unwrap(), b'|');
        assert_eq!(config.plot, Some(PathBuf::from("plot.txt")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = DemandConfig::from_toml_str("simulation_times = [2010, 2020]").unwrap();
        assert_eq!(config.methods.len(), 2);
        assert_eq!(config.separator, "comma");
    }

    #[test]
    fn test_unknown_method_rejected() {
        assert!(DemandConfig::from_toml_str(r#"methods = ["cubic"]"#).is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(DemandConfig::from_toml_str("threads = 4").is_err());
    }

    #[test]
    fn test_validate_requires_times() {
        let config = DemandConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "simulation_times = [2010, 2015]\nmethods = [\"linear\"]\n").unwrap();
        let config = DemandConfig::load(&path).unwrap();
        assert_eq!(config.methods, vec![RegressionMethod::Linear]);
        assert!(config.validate().is_ok());
    }
}
