use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeAccuracy {
    Rooftop,
    Approximate,
}

impl GeocodeAccuracy {
    pub fn as_str(self) -> &'static str {
        match self {
            GeocodeAccuracy::Rooftop => "rooftop",
            GeocodeAccuracy::Approximate => "approximate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeSource {
    Google,
    OpenCage,
    Nominatim,
}

impl GeocodeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            GeocodeSource::Google => "google",
            GeocodeSource::OpenCage => "opencage",
            GeocodeSource::Nominatim => "nominatim",
        }
    }
}

impl fmt::Display for GeocodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates for one address, tagged with who produced them and how
/// precise the provider claims they are.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: GeocodeAccuracy,
    pub source: GeocodeSource,
    pub county: Option<String>,
}

// Google Geocoding API
//  ├── status            "OK" | "ZERO_RESULTS" | "REQUEST_DENIED" | ...
//  ├── error_message
//  └── results[]
//       ├── geometry
//       │    ├── location { lat, lng }
//       │    └── location_type   "ROOFTOP" | "RANGE_INTERPOLATED" | ...
//       └── address_components[]
//            ├── long_name
//            └── types[]          "administrative_area_level_2" = county

#[derive(Debug, Deserialize)]
pub struct GoogleResponse {
    pub status: String,
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GoogleResult>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleResult {
    pub geometry: GoogleGeometry,
    #[serde(default)]
    pub address_components: Vec<GoogleAddressComponent>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleGeometry {
    pub location: GoogleLocation,
    pub location_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct GoogleAddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

// OpenCage
//  ├── status { code, message }
//  └── results[]
//       ├── geometry { lat, lng }
//       ├── confidence       1..10, 10 = most precise
//       └── components { county, _type, ... }

#[derive(Debug, Deserialize)]
pub struct OpenCageResponse {
    pub status: Option<OpenCageStatus>,
    #[serde(default)]
    pub results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageStatus {
    pub code: u16,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageResult {
    pub geometry: OpenCageGeometry,
    pub confidence: Option<u8>,
    #[serde(default)]
    pub components: OpenCageComponents,
}

#[derive(Debug, Deserialize)]
pub struct OpenCageGeometry {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenCageComponents {
    pub county: Option<String>,
    #[serde(rename = "_type")]
    pub place_type: Option<String>,
}

// Nominatim (format=json, addressdetails=1) returns a bare array
//  └── []
//       ├── lat, lon        strings
//       ├── class / type    "building" / "house" for exact hits
//       └── address { county, ... }

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(alias = "category")]
    pub class: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
pub struct NominatimAddress {
    pub county: Option<String>,
}
