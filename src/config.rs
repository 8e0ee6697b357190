use crate::errors::EnrichError;
use dotenvy::dotenv;
use std::env;

/// Credentials and transport settings for the geocoding chain.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    /// Google Geocoding API key. Google is skipped when absent.
    pub google_api_key: Option<String>,
    /// OpenCage API key. OpenCage is skipped when absent.
    pub opencage_api_key: Option<String>,
    /// Per-request timeout for every provider call.
    pub timeout_secs: u64,
    /// Sent with every request; Nominatim rejects anonymous clients.
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            opencage_api_key: None,
            timeout_secs: 10,
            user_agent: "listing-enrichment/0.1 (listing geocoder)".to_string(),
        }
    }
}

/// Process-wide settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub db_path: String,
    pub geocoding: GeocodingConfig,
    /// Annual appreciation (percent) used for the 5-year ROI projection
    /// when a listing carries no rate of its own.
    pub default_appreciation_rate: f64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            db_path: "listings.sqlite3".to_string(),
            geocoding: GeocodingConfig::default(),
            default_appreciation_rate: 3.0,
        }
    }
}

impl EnrichConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, EnrichError> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        Ok(Self {
            db_path: env::var("LISTING_DB_PATH").unwrap_or(defaults.db_path),
            geocoding: GeocodingConfig {
                google_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
                opencage_api_key: non_empty_var("OPENCAGE_API_KEY"),
                timeout_secs: parse_var("GEOCODING_TIMEOUT_SECS")?
                    .unwrap_or(defaults.geocoding.timeout_secs),
                user_agent: env::var("GEOCODING_USER_AGENT")
                    .unwrap_or(defaults.geocoding.user_agent),
            },
            default_appreciation_rate: parse_var("DEFAULT_APPRECIATION_RATE")?
                .unwrap_or(defaults.default_appreciation_rate),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, EnrichError> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| EnrichError::Config(format!("{name} must be a valid number, got {raw:?}"))),
        None => Ok(None),
    }
}
