use thiserror::Error;

/// Why a single provider attempt produced no coordinates. None of these is
/// fatal: the resolver logs it and moves on to the next provider.
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider returned HTTP {0}")]
    Status(u16),
    #[error("Provider rejected request: {0}")]
    Rejected(String),
    #[error("No results for address")]
    NoResults,
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
}

impl From<reqwest::Error> for GeocodingError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => GeocodingError::Status(status.as_u16()),
            None => GeocodingError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for GeocodingError {
    fn from(e: serde_json::Error) -> Self {
        GeocodingError::JsonParse(e.to_string())
    }
}
