use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input file not found: {0}")]
    MissingInput(String),

    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("Chart rendering failed: {message}")]
    Chart { message: String },
}

impl AnalyticsError {
    pub fn chart(err: impl std::fmt::Display) -> Self {
        AnalyticsError::Chart { message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
