// src/tests/geocoding_cache_tests.rs
use super::utils::*;
use crate::config::EnrichConfig;
use crate::domain::fields::{Field, FieldValue};
use crate::enrichment::{EnrichmentService, GeocodeOutcome};
use crate::geocoding::{address_hash, GeocodeSource};
use crate::store::InMemoryStore;

#[test]
fn unchanged_address_is_geocoded_once() {
    let (service, google_calls) = service_with_google();
    let store = service.store();
    seed(store, 1, austin_listing());

    let first = service.enrich_at(1, day(1)).unwrap();
    let second = service.enrich_at(1, day(2)).unwrap();

    assert_eq!(first.geocode, GeocodeOutcome::Resolved(GeocodeSource::Google));
    assert_eq!(second.geocode, GeocodeOutcome::CacheHit);
    assert_eq!(calls(&google_calls), 1);

    assert_close(number(store, 1, Field::Latitude), 30.2672);
    assert_close(number(store, 1, Field::Longitude), -97.7431);
    assert_eq!(text(store, 1, Field::GeocodingSource).as_deref(), Some("google"));
    assert_eq!(text(store, 1, Field::GeocodingAccuracy).as_deref(), Some("rooftop"));
    assert_eq!(text(store, 1, Field::County).as_deref(), Some("Travis County"));
    assert_eq!(get(store, 1, Field::GeocodedAt), Some(FieldValue::Timestamp(day(1))));
    assert_eq!(
        text(store, 1, Field::GeocodeHash),
        Some(address_hash(Some("12 Oak Ave"), Some("Austin"), Some("TX"), Some("78701")))
    );
}

#[test]
fn changed_address_is_geocoded_again() {
    let (service, google_calls) = service_with_google();
    let store = service.store();
    seed(store, 2, austin_listing());
    service.enrich_at(2, day(1)).unwrap();

    seed(store, 2, vec![(Field::StreetAddress, "14 Oak Ave".into())]);
    let report = service.enrich_at(2, day(2)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::Resolved(GeocodeSource::Google));
    assert_eq!(calls(&google_calls), 2);
}

#[test]
fn missing_coordinates_defeat_the_cache() {
    let (service, google_calls) = service_with_google();
    let store = service.store();
    let mut fields = austin_listing();
    fields.push((
        Field::GeocodeHash,
        address_hash(Some("12 Oak Ave"), Some("Austin"), Some("TX"), Some("78701")).into(),
    ));
    seed(store, 3, fields);

    service.enrich_at(3, day(1)).unwrap();

    assert_eq!(calls(&google_calls), 1);
}

#[test]
fn falls_back_until_a_provider_answers() {
    let (resolver, counters) = scripted_resolver(&[
        (GeocodeSource::Google, false),
        (GeocodeSource::OpenCage, false),
        (GeocodeSource::Nominatim, true),
    ]);
    let service = EnrichmentService::new(InMemoryStore::new(), resolver, &EnrichConfig::default());
    seed(service.store(), 4, austin_listing());

    let report = service.enrich_at(4, day(1)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::Resolved(GeocodeSource::Nominatim));
    assert_eq!(
        counters.iter().map(calls).collect::<Vec<_>>(),
        vec![1, 1, 1]
    );
    assert_eq!(
        text(service.store(), 4, Field::GeocodingSource).as_deref(),
        Some("nominatim")
    );
}

#[test]
fn first_success_stops_the_chain() {
    let (resolver, counters) = scripted_resolver(&[
        (GeocodeSource::Google, false),
        (GeocodeSource::OpenCage, true),
        (GeocodeSource::Nominatim, true),
    ]);
    let service = EnrichmentService::new(InMemoryStore::new(), resolver, &EnrichConfig::default());
    seed(service.store(), 5, austin_listing());

    let report = service.enrich_at(5, day(1)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::Resolved(GeocodeSource::OpenCage));
    assert_eq!(calls(&counters[2]), 0);
}

#[test]
fn total_failure_leaves_coordinates_unset() {
    let (resolver, _) = scripted_resolver(&[
        (GeocodeSource::Google, false),
        (GeocodeSource::OpenCage, false),
        (GeocodeSource::Nominatim, false),
    ]);
    let service = EnrichmentService::new(InMemoryStore::new(), resolver, &EnrichConfig::default());
    let store = service.store();
    seed(store, 6, austin_listing());

    let report = service.enrich_at(6, day(1)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::Failed);
    assert_eq!(get(store, 6, Field::Latitude), None);
    assert_eq!(get(store, 6, Field::Longitude), None);
    assert_eq!(get(store, 6, Field::GeocodeHash), None);
    // Everything else still ran.
    assert_eq!(text(store, 6, Field::StreetNumber).as_deref(), Some("12"));
}

#[test]
fn city_alone_is_still_geocoded() {
    let (service, google_calls) = service_with_google();
    let store = service.store();
    seed(
        store,
        7,
        vec![(Field::City, "Austin".into()), (Field::State, "TX".into())],
    );

    let report = service.enrich_at(7, day(1)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::Resolved(GeocodeSource::Google));
    assert_eq!(calls(&google_calls), 1);
    assert_eq!(
        text(store, 7, Field::GeocodeHash),
        Some(address_hash(None, Some("Austin"), Some("TX"), None))
    );
}

#[test]
fn no_address_fields_means_no_geocoding() {
    let (service, google_calls) = service_with_google();
    seed(service.store(), 8, vec![(Field::Price, FieldValue::Number(250_000.0))]);

    let report = service.enrich_at(8, day(1)).unwrap();

    assert_eq!(report.geocode, GeocodeOutcome::NoAddress);
    assert_eq!(calls(&google_calls), 0);
}
