use thiserror::Error;

#[derive(Debug, Error)]
pub enum OmicsError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Invalid clinical table: {0}")]
    InvalidClinical(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analysis cancelled before {phase}")]
    Cancelled { phase: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OmicsError>;
