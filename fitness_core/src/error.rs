//! Error types for the fitness_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitness_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected input (non-positive calorie fields, malformed dates, NaN progress)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An update referenced a record that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Progress increment on a workout that is already complete
    #[error("Workout {0} is already at 100% progress")]
    ProgressComplete(i64),

    /// Local storage failure; fatal to the in-flight operation
    #[error("Storage fault: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Another store instance holds the database
    #[error("Record store at {0:?} is already open")]
    StoreLocked(PathBuf),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the local storage layer itself
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}
