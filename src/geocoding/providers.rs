// providers.rs
use crate::config::GeocodingConfig;
use crate::geocoding::models::{
    GeocodeAccuracy, GeocodeResult, GeocodeSource, GoogleResponse, NominatimPlace,
    OpenCageResponse,
};
use crate::geocoding::GeocodingError;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

const GOOGLE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const OPENCAGE_ENDPOINT: &str = "https://api.opencagedata.com/geocode/v1/json";
const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// One geocoding backend. Implementations make exactly one attempt per call
/// and never retry; falling back is the resolver's job.
pub trait GeocodingProvider: Send + Sync {
    fn source(&self) -> GeocodeSource;
    fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodingError>;
}

/// Shared blocking client with the per-request timeout baked in.
pub fn build_client(cfg: &GeocodingConfig) -> Result<Client, GeocodingError> {
    Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()
        .map_err(|e| GeocodingError::Network(e.to_string()))
}

fn endpoint(base: &str, params: &[(&str, &str)]) -> Result<Url, GeocodingError> {
    Url::parse_with_params(base, params).map_err(|e| GeocodingError::UnexpectedShape(e.to_string()))
}

fn get_text(client: &Client, url: Url) -> Result<String, GeocodingError> {
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(GeocodingError::Status(status.as_u16()));
    }
    Ok(resp.text()?)
}

// ---------------------------------------------------------------------------
// Google
// ---------------------------------------------------------------------------

pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

impl GeocodingProvider for GoogleGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::Google
    }

    fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodingError> {
        let url = endpoint(GOOGLE_ENDPOINT, &[("address", address), ("key", self.api_key.as_str())])?;
        debug!(address, "google geocode request");
        parse_google(&get_text(&self.client, url)?)
    }
}

pub fn parse_google(body: &str) -> Result<GeocodeResult, GeocodingError> {
    let resp: GoogleResponse = serde_json::from_str(body)?;
    match resp.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(GeocodingError::NoResults),
        other => {
            return Err(GeocodingError::Rejected(format!(
                "{other}: {}",
                resp.error_message.unwrap_or_default()
            )))
        }
    }

    let first = resp.results.into_iter().next().ok_or(GeocodingError::NoResults)?;
    let accuracy = match first.geometry.location_type.as_deref() {
        Some("ROOFTOP") => GeocodeAccuracy::Rooftop,
        _ => GeocodeAccuracy::Approximate,
    };
    let county = first
        .address_components
        .into_iter()
        .find(|c| c.types.iter().any(|t| t == "administrative_area_level_2"))
        .map(|c| c.long_name);

    Ok(GeocodeResult {
        latitude: first.geometry.location.lat,
        longitude: first.geometry.location.lng,
        accuracy,
        source: GeocodeSource::Google,
        county,
    })
}

// ---------------------------------------------------------------------------
// OpenCage
// ---------------------------------------------------------------------------

pub struct OpenCageGeocoder {
    client: Client,
    api_key: String,
}

impl OpenCageGeocoder {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

impl GeocodingProvider for OpenCageGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::OpenCage
    }

    fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodingError> {
        let url = endpoint(
            OPENCAGE_ENDPOINT,
            &[("q", address), ("key", self.api_key.as_str()), ("limit", "1"), ("no_annotations", "1")],
        )?;
        debug!(address, "opencage geocode request");
        parse_opencage(&get_text(&self.client, url)?)
    }
}

pub fn parse_opencage(body: &str) -> Result<GeocodeResult, GeocodingError> {
    let resp: OpenCageResponse = serde_json::from_str(body)?;
    if let Some(status) = &resp.status {
        if status.code != 200 {
            return Err(GeocodingError::Rejected(format!(
                "{}: {}",
                status.code,
                status.message.as_deref().unwrap_or("")
            )));
        }
    }

    let first = resp.results.into_iter().next().ok_or(GeocodingError::NoResults)?;
    let exact_type = matches!(first.components.place_type.as_deref(), Some("building" | "house"));
    let accuracy = if first.confidence.unwrap_or(0) >= 9 || exact_type {
        GeocodeAccuracy::Rooftop
    } else {
        GeocodeAccuracy::Approximate
    };

    Ok(GeocodeResult {
        latitude: first.geometry.lat,
        longitude: first.geometry.lng,
        accuracy,
        source: GeocodeSource::OpenCage,
        county: first.components.county,
    })
}

// ---------------------------------------------------------------------------
// Nominatim
// ---------------------------------------------------------------------------

/// OpenStreetMap's free geocoder. Needs no key, so it is always the last
/// link of the chain.
pub struct NominatimGeocoder {
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl GeocodingProvider for NominatimGeocoder {
    fn source(&self) -> GeocodeSource {
        GeocodeSource::Nominatim
    }

    fn geocode(&self, address: &str) -> Result<GeocodeResult, GeocodingError> {
        let url = endpoint(
            NOMINATIM_ENDPOINT,
            &[("q", address), ("format", "json"), ("addressdetails", "1"), ("limit", "1")],
        )?;
        debug!(address, "nominatim geocode request");
        parse_nominatim(&get_text(&self.client, url)?)
    }
}

pub fn parse_nominatim(body: &str) -> Result<GeocodeResult, GeocodingError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    let first = places.into_iter().next().ok_or(GeocodingError::NoResults)?;

    let latitude: f64 = first
        .lat
        .parse()
        .map_err(|_| GeocodingError::UnexpectedShape(format!("invalid latitude {:?}", first.lat)))?;
    let longitude: f64 = first
        .lon
        .parse()
        .map_err(|_| GeocodingError::UnexpectedShape(format!("invalid longitude {:?}", first.lon)))?;

    let exact = matches!(first.class.as_deref(), Some("building"))
        || matches!(first.place_type.as_deref(), Some("house" | "building"));

    Ok(GeocodeResult {
        latitude,
        longitude,
        accuracy: if exact {
            GeocodeAccuracy::Rooftop
        } else {
            GeocodeAccuracy::Approximate
        },
        source: GeocodeSource::Nominatim,
        county: first.address.and_then(|a| a.county),
    })
}
