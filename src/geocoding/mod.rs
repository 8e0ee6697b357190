mod geocoding_error;
pub mod models;
pub mod providers;
mod resolver;

pub use geocoding_error::GeocodingError;
pub use models::{GeocodeAccuracy, GeocodeResult, GeocodeSource};
pub use providers::GeocodingProvider;
pub use resolver::{address_hash, GeocodingResolver};
