use thiserror::Error;

/// Error type for the layers around the analytics core (configuration,
/// dataset loading). The core itself never fails.
#[derive(Error, Debug)]
pub enum BenchLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}

pub type Result<T> = std::result::Result<T, BenchLensError>;
