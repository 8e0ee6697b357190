// resolver.rs
use crate::config::GeocodingConfig;
use crate::geocoding::models::{GeocodeResult, GeocodeSource};
use crate::geocoding::providers::{
    build_client, GeocodingProvider, GoogleGeocoder, NominatimGeocoder, OpenCageGeocoder,
};
use crate::geocoding::GeocodingError;
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Content hash of the four address fields that drive geocoding. Two
/// listings (or two passes) with the same hash resolve to the same place.
pub fn address_hash(
    street: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
) -> String {
    let normalized: Vec<String> = [street, city, state, zip]
        .iter()
        .map(|part| part.unwrap_or("").trim().to_lowercase())
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(normalized.join("|").as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Walks an ordered provider chain until one returns coordinates.
pub struct GeocodingResolver {
    providers: Vec<Box<dyn GeocodingProvider>>,
}

impl GeocodingResolver {
    /// Google, then OpenCage, then Nominatim. Keyed providers without a key
    /// are left out; Nominatim is always present.
    pub fn from_config(cfg: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = build_client(cfg)?;
        let mut providers: Vec<Box<dyn GeocodingProvider>> = Vec::new();

        if let Some(key) = &cfg.google_api_key {
            providers.push(Box::new(GoogleGeocoder::new(client.clone(), key.as_str())));
        }
        if let Some(key) = &cfg.opencage_api_key {
            providers.push(Box::new(OpenCageGeocoder::new(client.clone(), key.as_str())));
        }
        providers.push(Box::new(NominatimGeocoder::new(client)));

        Ok(Self::with_providers(providers))
    }

    pub fn with_providers(providers: Vec<Box<dyn GeocodingProvider>>) -> Self {
        Self { providers }
    }

    pub fn sources(&self) -> Vec<GeocodeSource> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    /// One attempt per provider, in order. The first success wins; failures
    /// are logged and skipped. Returns `None` when every provider failed.
    pub fn resolve(&self, address: &str) -> Option<GeocodeResult> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        for provider in &self.providers {
            let source = provider.source();
            let start = Instant::now();

            match provider.geocode(address) {
                Ok(result) => {
                    info!(
                        %source,
                        lat = result.latitude,
                        lng = result.longitude,
                        accuracy = result.accuracy.as_str(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "geocoded address"
                    );
                    return Some(result);
                }
                Err(e) => {
                    warn!(%source, error = %e, "geocoding provider failed, trying next");
                }
            }
        }

        debug!(address, "all geocoding providers failed");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::models::GeocodeAccuracy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        source: GeocodeSource,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    impl GeocodingProvider for Scripted {
        fn source(&self) -> GeocodeSource {
            self.source
        }

        fn geocode(&self, _address: &str) -> Result<GeocodeResult, GeocodingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(GeocodeResult {
                    latitude: 1.0,
                    longitude: 2.0,
                    accuracy: GeocodeAccuracy::Approximate,
                    source: self.source,
                    county: None,
                })
            } else {
                Err(GeocodingError::Network("timed out".into()))
            }
        }
    }

    fn chain(outcomes: &[(GeocodeSource, bool)]) -> (GeocodingResolver, Vec<Arc<AtomicUsize>>) {
        let counters: Vec<Arc<AtomicUsize>> = outcomes.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let providers = outcomes
            .iter()
            .zip(&counters)
            .map(|((source, succeed), calls)| {
                Box::new(Scripted {
                    source: *source,
                    succeed: *succeed,
                    calls: calls.clone(),
                }) as Box<dyn GeocodingProvider>
            })
            .collect();
        (GeocodingResolver::with_providers(providers), counters)
    }

    fn counts(counters: &[Arc<AtomicUsize>]) -> Vec<usize> {
        counters.iter().map(|c| c.load(Ordering::SeqCst)).collect()
    }

    #[test]
    fn first_success_short_circuits() {
        let (resolver, counters) = chain(&[
            (GeocodeSource::Google, true),
            (GeocodeSource::OpenCage, true),
            (GeocodeSource::Nominatim, true),
        ]);
        let result = resolver.resolve("12 Oak Ave, Austin, TX").unwrap();
        assert_eq!(result.source, GeocodeSource::Google);
        assert_eq!(counts(&counters), vec![1, 0, 0]);
    }

    #[test]
    fn failure_falls_through_to_next_provider() {
        let (resolver, counters) = chain(&[
            (GeocodeSource::Google, false),
            (GeocodeSource::OpenCage, true),
            (GeocodeSource::Nominatim, true),
        ]);
        assert_eq!(resolver.resolve("x").unwrap().source, GeocodeSource::OpenCage);
        assert_eq!(counts(&counters), vec![1, 1, 0]);
    }

    #[test]
    fn two_failures_reach_the_free_provider() {
        let (resolver, counters) = chain(&[
            (GeocodeSource::Google, false),
            (GeocodeSource::OpenCage, false),
            (GeocodeSource::Nominatim, true),
        ]);
        assert_eq!(resolver.resolve("x").unwrap().source, GeocodeSource::Nominatim);
        assert_eq!(counts(&counters), vec![1, 1, 1]);
    }

    #[test]
    fn all_failing_returns_none_without_retries() {
        let (resolver, counters) = chain(&[
            (GeocodeSource::Google, false),
            (GeocodeSource::Nominatim, false),
        ]);
        assert!(resolver.resolve("x").is_none());
        assert_eq!(counts(&counters), vec![1, 1]);
    }

    #[test]
    fn blank_address_never_calls_out() {
        let (resolver, counters) = chain(&[(GeocodeSource::Nominatim, true)]);
        assert!(resolver.resolve("  ").is_none());
        assert_eq!(counts(&counters), vec![0]);
    }

    #[test]
    fn keyless_config_only_has_nominatim() {
        let resolver = GeocodingResolver::from_config(&GeocodingConfig::default()).unwrap();
        assert_eq!(resolver.sources(), vec![GeocodeSource::Nominatim]);
    }

    #[test]
    fn keyed_config_orders_the_chain() {
        let cfg = GeocodingConfig {
            google_api_key: Some("g".into()),
            opencage_api_key: Some("o".into()),
            ..Default::default()
        };
        let resolver = GeocodingResolver::from_config(&cfg).unwrap();
        assert_eq!(
            resolver.sources(),
            vec![GeocodeSource::Google, GeocodeSource::OpenCage, GeocodeSource::Nominatim]
        );
    }

    #[test]
    fn hash_ignores_case_and_padding() {
        let a = address_hash(Some("12 Oak Ave"), Some("Austin"), Some("TX"), Some("78701"));
        let b = address_hash(Some(" 12 oak ave "), Some("AUSTIN"), Some("tx"), Some("78701"));
        let c = address_hash(Some("14 Oak Ave"), Some("Austin"), Some("TX"), Some("78701"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
