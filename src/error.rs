//! Error types for the planet catalog

use thiserror::Error;

/// Everything that can go wrong while ingesting or serving planets
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failure or non-success status from the upstream source
    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    /// Upstream response did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Population value that is neither "unknown" nor a non-negative integer
    #[error("Invalid population for {planet}: {value}")]
    InvalidPopulation { planet: String, value: String },

    /// Strict create or rename onto an existing planet name
    #[error("Planet already exists: {0}")]
    Conflict(String),

    /// Unknown planet id, as given by the caller
    #[error("Planet not found: {0}")]
    NotFound(String),

    /// Request body rejected by the codec
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Fetch(err.to_string())
    }
}

/// Result type alias for CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
