use thiserror::Error;

/// Errors that can occur while projecting land development demand.
#[derive(Error, Debug)]
pub enum DemandError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Count mismatch: {0}")]
    CountMismatch(String),

    #[error("Subregion '{subregion}' is missing from the {table} table")]
    MissingSubregion { subregion: String, table: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Undefined transform: {0}")]
    UndefinedTransform(String),

    #[error("No viable model: {0}")]
    NoViableModel(String),

    #[error("External process error: {0}")]
    ExternalProcess(String),
}

impl DemandError {
    /// Shorthand for a missing-subregion precondition fault.
    pub fn missing(subregion: impl Into<String>, table: impl Into<String>) -> Self {
        DemandError::MissingSubregion {
            subregion: subregion.into(),
            table: table.into(),
        }
    }
}
