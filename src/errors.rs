// errors.rs
use thiserror::Error;

/// Errors that abort an enrichment pass.
///
/// Only persistence and configuration problems end up here. Parse misses,
/// geocoding failures and guarded arithmetic never surface as errors; they
/// just leave fields unwritten.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Listing {0} not found")]
    NotFound(i64),
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Serialization Error: {0}")]
    Serialization(String),
    #[error("Configuration Error: {0}")]
    Config(String),
}

// Type alias used by store and orchestrator code.
pub type EnrichResult<T> = Result<T, EnrichError>;

impl From<rusqlite::Error> for EnrichError {
    fn from(e: rusqlite::Error) -> Self {
        EnrichError::DbError(e.to_string())
    }
}

impl From<serde_json::Error> for EnrichError {
    fn from(e: serde_json::Error) -> Self {
        EnrichError::Serialization(e.to_string())
    }
}
