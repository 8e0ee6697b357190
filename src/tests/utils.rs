// src/tests/utils.rs
use crate::config::EnrichConfig;
use crate::domain::fields::{Field, FieldValue};
use crate::enrichment::EnrichmentService;
use crate::geocoding::{GeocodeAccuracy, GeocodeResult, GeocodeSource, GeocodingError, GeocodingProvider, GeocodingResolver};
use crate::store::{InMemoryStore, ListingStore};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A provider that answers from a script and counts how often it was asked.
pub struct CountingProvider {
    pub source: GeocodeSource,
    pub succeed: bool,
    pub calls: Arc<AtomicUsize>,
}

impl GeocodingProvider for CountingProvider {
    fn source(&self) -> GeocodeSource {
        self.source
    }

    fn geocode(&self, _address: &str) -> Result<GeocodeResult, GeocodingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.succeed {
            return Err(GeocodingError::NoResults);
        }
        Ok(GeocodeResult {
            latitude: 30.2672,
            longitude: -97.7431,
            accuracy: GeocodeAccuracy::Rooftop,
            source: self.source,
            county: Some("Travis County".to_string()),
        })
    }
}

/// Builds a resolver over scripted providers, returning one call counter
/// per provider in chain order.
pub fn scripted_resolver(chain: &[(GeocodeSource, bool)]) -> (GeocodingResolver, Vec<Arc<AtomicUsize>>) {
    let mut counters = Vec::new();
    let mut providers: Vec<Box<dyn GeocodingProvider>> = Vec::new();
    for (source, succeed) in chain {
        let calls = Arc::new(AtomicUsize::new(0));
        counters.push(calls.clone());
        providers.push(Box::new(CountingProvider {
            source: *source,
            succeed: *succeed,
            calls,
        }));
    }
    (GeocodingResolver::with_providers(providers), counters)
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// An in-memory service whose only provider always succeeds.
pub fn service_with_google() -> (EnrichmentService<InMemoryStore>, Arc<AtomicUsize>) {
    let (resolver, mut counters) = scripted_resolver(&[(GeocodeSource::Google, true)]);
    let service = EnrichmentService::new(InMemoryStore::new(), resolver, &EnrichConfig::default());
    (service, counters.remove(0))
}

pub fn seed<S: ListingStore>(store: &S, listing_id: i64, fields: Vec<(Field, FieldValue)>) {
    for (field, value) in fields {
        store
            .set(listing_id, field, value)
            .unwrap_or_else(|e| panic!("seeding {} failed: {e}", field.name()));
    }
}

pub fn get<S: ListingStore>(store: &S, listing_id: i64, field: Field) -> Option<FieldValue> {
    store.get(listing_id, field).expect("store read failed")
}

pub fn number<S: ListingStore>(store: &S, listing_id: i64, field: Field) -> Option<f64> {
    get(store, listing_id, field).and_then(|v| v.as_f64())
}

pub fn text<S: ListingStore>(store: &S, listing_id: i64, field: Field) -> Option<String> {
    get(store, listing_id, field).and_then(|v| v.as_text())
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 9, 30, 0).unwrap()
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, field was unset"));
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}

pub fn austin_listing() -> Vec<(Field, FieldValue)> {
    vec![
        (Field::StreetAddress, "12 Oak Ave".into()),
        (Field::City, "Austin".into()),
        (Field::State, "TX".into()),
        (Field::ZipCode, "78701".into()),
    ]
}
