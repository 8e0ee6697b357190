use listing_enrichment::db::{init_db, Database, SqliteListingStore, SCHEMA_SQL};
use listing_enrichment::{EnrichConfig, EnrichError, EnrichmentService};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listing_enrichment=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        error!(error = %e, "enrichment run failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), EnrichError> {
    let config = EnrichConfig::from_env()?;

    // Usage: listing_enrichment <listing_id>...
    let ids = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<i64>()
                .map_err(|_| EnrichError::Config(format!("not a listing id: {arg}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(EnrichError::Config(
            "usage: listing_enrichment <listing_id>...".into(),
        ));
    }

    let db = Database::new(config.db_path.clone());
    init_db(&db, SCHEMA_SQL)?;

    let store = SqliteListingStore::new(db);
    let service = EnrichmentService::from_config(store, &config)?;

    for id in ids {
        let report = service.enrich(id)?;
        info!(
            listing_id = id,
            fields_written = report.fields_written,
            "done"
        );
    }
    Ok(())
}
