//! Error handling for the skill bridge engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillBridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    /// No index has been built or loaded. Distinct from a query with zero hits.
    #[error("Vector index not available: {0}")]
    IndexUnavailable(String),

    #[error("Vector index corrupted: {0}")]
    IndexCorrupted(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Text generation error: {0}")]
    Generation(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

pub type Result<T> = std::result::Result<T, SkillBridgeError>;

/// Convert anyhow errors from the model library to our custom error type
impl From<anyhow::Error> for SkillBridgeError {
    fn from(err: anyhow::Error) -> Self {
        SkillBridgeError::Embedding(format!("Failed to load model: {:#}", err))
    }
}

impl SkillBridgeError {
    /// Validation failures that a caller should report back as bad input
    pub fn is_validation(&self) -> bool {
        matches!(self, SkillBridgeError::InvalidInput(_))
    }
}
