//! Listing enrichment: turns the raw fields of a real-estate listing into
//! parsed address parts, coordinates, financing and investment figures,
//! change history and display fields.

pub mod config;
pub mod db;
pub mod domain;
pub mod enrichment;
pub mod errors;
pub mod geocoding;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{EnrichConfig, GeocodingConfig};
pub use domain::fields::{Field, FieldValue};
pub use enrichment::{EnrichmentReport, EnrichmentService, GeocodeOutcome};
pub use errors::{EnrichError, EnrichResult};
pub use store::{InMemoryStore, ListingRepository, ListingStore};
