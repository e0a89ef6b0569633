//! Error types for Runway

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    #[error("Calendar resolution error: {0}")]
    CalendarResolution(String),

    #[error("Computation cancelled")]
    Cancelled,

    #[error("Computation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Background job failed: {0}")]
    Job(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by caller-supplied data rather than the engine
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::UnsupportedFrequency(_)
                | Error::CalendarResolution(_)
                | Error::Import(_)
                | Error::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
