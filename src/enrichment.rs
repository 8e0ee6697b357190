// src/enrichment.rs

use crate::config::EnrichConfig;
use crate::domain::address::{clean_street, parse_street_address};
use crate::domain::changes::{ChangeOutcome, ChangeTracker};
use crate::domain::derived::{self, SeoInputs};
use crate::domain::fields::{Field, FieldValue};
use crate::domain::financial::FinancialSummary;
use crate::domain::investment::{self, InvestmentInputs};
use crate::domain::listing::{ListingSnapshot, TrackedState};
use crate::errors::{EnrichError, EnrichResult};
use crate::geocoding::{address_hash, GeocodeSource, GeocodingResolver};
use crate::store::{ListingRepository, ListingStore};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

/// What happened to the coordinates during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeOutcome {
    /// No street address to geocode.
    NoAddress,
    /// Address unchanged since the last successful geocode.
    CacheHit,
    Resolved(GeocodeSource),
    /// Every provider failed; stored coordinates were left as they were.
    Failed,
}

/// Summary of one enrichment pass, mostly for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentReport {
    pub listing_id: i64,
    pub fields_written: usize,
    pub address_parsed: bool,
    pub geocode: GeocodeOutcome,
    pub investment_analyzed: bool,
    pub price_changed: bool,
    pub status_changed: bool,
}

// Counts writes so the report can say how much a pass touched.
struct FieldWriter<'r, 's, S: ListingStore + ?Sized> {
    repo: &'r ListingRepository<'s, S>,
    written: usize,
}

impl<'r, 's, S: ListingStore + ?Sized> FieldWriter<'r, 's, S> {
    fn new(repo: &'r ListingRepository<'s, S>) -> Self {
        Self { repo, written: 0 }
    }

    fn put(&mut self, field: Field, value: impl Into<FieldValue>) -> EnrichResult<()> {
        self.repo.set(field, value)?;
        self.written += 1;
        Ok(())
    }

    fn put_or_clear<V: Into<FieldValue>>(&mut self, field: Field, value: Option<V>) -> EnrichResult<()> {
        if self.repo.set_or_clear(field, value)? {
            self.written += 1;
        }
        Ok(())
    }

    fn put_opt<V: Into<FieldValue>>(&mut self, field: Field, value: Option<V>) -> EnrichResult<()> {
        if self.repo.set_opt(field, value)? {
            self.written += 1;
        }
        Ok(())
    }
}

/// The single entry point callers use after a listing is saved.
///
/// Construct one per process and share it; it holds no per-listing state.
/// Callers must not enrich the same listing from two threads at once: price
/// history is read, extended and written back within one pass.
pub struct EnrichmentService<S: ListingStore> {
    store: S,
    resolver: GeocodingResolver,
    default_appreciation_rate: f64,
}

impl<S: ListingStore> EnrichmentService<S> {
    pub fn new(store: S, resolver: GeocodingResolver, config: &EnrichConfig) -> Self {
        Self {
            store,
            resolver,
            default_appreciation_rate: config.default_appreciation_rate,
        }
    }

    pub fn from_config(store: S, config: &EnrichConfig) -> EnrichResult<Self> {
        let resolver = GeocodingResolver::from_config(&config.geocoding)
            .map_err(|e| EnrichError::Config(format!("geocoding client: {e}")))?;
        Ok(Self::new(store, resolver, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn enrich(&self, listing_id: i64) -> EnrichResult<EnrichmentReport> {
        self.enrich_at(listing_id, Utc::now())
    }

    /// Runs every stage against the listing as of `now`. Only store failures
    /// are returned as errors; everything else degrades to unwritten fields.
    #[instrument(skip(self, now))]
    pub fn enrich_at(&self, listing_id: i64, now: DateTime<Utc>) -> EnrichResult<EnrichmentReport> {
        if !self.store.exists(listing_id)? {
            return Err(EnrichError::NotFound(listing_id));
        }

        let repo = ListingRepository::new(&self.store, listing_id);
        let listing = ListingSnapshot::load(&repo)?;
        let mut writer = FieldWriter::new(&repo);

        let address_parsed = self.apply_address(&listing, &repo, &mut writer)?;
        let geocode = self.apply_geocoding(&listing, &repo, &mut writer, now)?;
        let financials = FinancialSummary::compute(&listing);
        self.apply_financials(&financials, &mut writer)?;
        let investment_analyzed = self.apply_investment(&listing, &financials, &mut writer)?;
        let changes = self.apply_changes(&listing, &repo, &mut writer, now)?;
        self.apply_derived(&listing, &financials, &mut writer, now)?;

        let report = EnrichmentReport {
            listing_id,
            fields_written: writer.written,
            address_parsed,
            geocode,
            investment_analyzed,
            price_changed: changes.price_changed(),
            status_changed: changes.status_changed(),
        };

        info!(
            listing_id,
            fields_written = report.fields_written,
            geocode = ?report.geocode,
            price_changed = report.price_changed,
            "listing enriched"
        );
        Ok(report)
    }

    fn apply_address(
        &self,
        listing: &ListingSnapshot,
        repo: &ListingRepository<'_, S>,
        w: &mut FieldWriter<'_, '_, S>,
    ) -> EnrichResult<bool> {
        // Everything here is recomputed each pass; absent results are cleared.
        w.put_or_clear(Field::LegacyRegion, listing.state.clone())?;
        w.put_or_clear(Field::LegacyZip, listing.zip_code.clone())?;

        let raw = listing.street_address.as_deref();
        let components = raw.map(parse_street_address).unwrap_or_default();
        let street = raw.map(|r| clean_street(r).0);

        w.put_or_clear(Field::StreetNumber, components.number.clone())?;
        w.put_or_clear(Field::StreetDirPrefix, components.dir_prefix.clone())?;
        w.put_or_clear(Field::StreetName, components.name.clone())?;
        w.put_or_clear(Field::StreetSuffix, components.suffix.clone())?;
        w.put_or_clear(Field::StreetDirSuffix, components.dir_suffix.clone())?;
        w.put_or_clear(Field::UnparsedAddress, raw)?;
        w.put_or_clear(Field::LegacyAddress, raw)?;

        let unit = self.apply_unit(listing, repo, components.unit.as_deref(), w)?;

        w.put_or_clear(
            Field::FullStreetAddress,
            derived::full_street_address(street.as_deref(), unit.as_deref()),
        )?;
        w.put_or_clear(
            Field::FullAddress,
            derived::full_address(
                street.as_deref(),
                unit.as_deref(),
                listing.city.as_deref(),
                listing.state.as_deref(),
                listing.zip_code.as_deref(),
            ),
        )?;

        if let Some(raw) = raw.filter(|_| components.is_empty()) {
            debug!(listing_id = listing.listing_id, address = raw, "street address matched no rule");
        }
        Ok(!components.is_empty())
    }

    /// Settles `unit_number`. A stored unit that differs from the one split
    /// off last pass was entered by hand and is kept; otherwise the unit
    /// follows the current street string.
    fn apply_unit(
        &self,
        listing: &ListingSnapshot,
        repo: &ListingRepository<'_, S>,
        split: Option<&str>,
        w: &mut FieldWriter<'_, '_, S>,
    ) -> EnrichResult<Option<String>> {
        let previous_split = repo.text(Field::SplitUnit)?;
        let entered = listing
            .unit_number
            .clone()
            .filter(|unit| previous_split.as_deref() != Some(unit.as_str()));

        if let Some(unit) = entered {
            w.put_or_clear(Field::SplitUnit, None::<String>)?;
            return Ok(Some(unit));
        }

        w.put_or_clear(Field::UnitNumber, split)?;
        w.put_or_clear(Field::SplitUnit, split)?;
        Ok(split.map(str::to_string))
    }

    fn apply_geocoding(
        &self,
        listing: &ListingSnapshot,
        repo: &ListingRepository<'_, S>,
        w: &mut FieldWriter<'_, '_, S>,
        now: DateTime<Utc>,
    ) -> EnrichResult<GeocodeOutcome> {
        if !listing.has_address() {
            return Ok(GeocodeOutcome::NoAddress);
        }

        let hash = address_hash(
            listing.street_address.as_deref(),
            listing.city.as_deref(),
            listing.state.as_deref(),
            listing.zip_code.as_deref(),
        );
        let has_coordinates =
            repo.number(Field::Latitude)?.is_some() && repo.number(Field::Longitude)?.is_some();
        if has_coordinates && repo.text(Field::GeocodeHash)?.as_deref() == Some(hash.as_str()) {
            debug!(listing_id = listing.listing_id, "address unchanged, skipping geocoding");
            return Ok(GeocodeOutcome::CacheHit);
        }

        // Units confuse most geocoders, so the query leaves them out.
        let street = listing.street_address.as_deref().map(|raw| clean_street(raw).0);
        let Some(query) = derived::full_address(
            street.as_deref(),
            None,
            listing.city.as_deref(),
            listing.state.as_deref(),
            listing.zip_code.as_deref(),
        ) else {
            return Ok(GeocodeOutcome::NoAddress);
        };

        let Some(result) = self.resolver.resolve(&query) else {
            return Ok(GeocodeOutcome::Failed);
        };

        w.put(Field::Latitude, result.latitude)?;
        w.put(Field::Longitude, result.longitude)?;
        w.put(Field::GeocodingAccuracy, result.accuracy.as_str())?;
        w.put(Field::GeocodingSource, result.source.as_str())?;
        w.put_opt(Field::County, result.county.clone())?;
        w.put(Field::GeocodedAt, now)?;
        w.put(Field::GeocodeHash, hash)?;
        Ok(GeocodeOutcome::Resolved(result.source))
    }

    fn apply_financials(
        &self,
        f: &FinancialSummary,
        w: &mut FieldWriter<'_, '_, S>,
    ) -> EnrichResult<()> {
        w.put_opt(Field::PricePerSqft, f.price_per_sqft)?;
        w.put_opt(Field::BathroomsTotal, f.bathrooms_total)?;
        w.put_opt(Field::LotSqft, f.lot_sqft)?;
        w.put_opt(Field::DownPaymentAmount, f.down_payment_amount)?;
        w.put_opt(Field::LoanAmount, f.loan_amount)?;
        w.put_opt(Field::EstimatedMonthlyPayment, f.monthly_payment)?;
        w.put_opt(Field::HoaTotalMonthly, f.hoa.map(|h| h.monthly))?;
        w.put_opt(Field::HoaTotalAnnual, f.hoa.map(|h| h.annual))?;
        w.put_opt(Field::PitiPayment, f.monthly_cost.map(|c| c.piti))?;
        w.put_opt(Field::TotalMonthlyCost, f.monthly_cost.map(|c| c.total))?;
        Ok(())
    }

    fn apply_investment(
        &self,
        listing: &ListingSnapshot,
        f: &FinancialSummary,
        w: &mut FieldWriter<'_, '_, S>,
    ) -> EnrichResult<bool> {
        let inputs = InvestmentInputs {
            price: listing.price,
            monthly_rent: listing.estimated_monthly_rent,
            total_monthly_payment: f.total_monthly_payment(),
            down_payment_amount: f.down_payment_amount,
            appreciation_rate: listing
                .appreciation_rate
                .unwrap_or(self.default_appreciation_rate),
        };
        let Some(m) = investment::analyze(&inputs) else {
            return Ok(false);
        };

        w.put(Field::GrossRentalYield, m.gross_rental_yield)?;
        w.put(Field::GrossRentMultiplier, m.gross_rent_multiplier)?;
        w.put(Field::OnePercentRuleRatio, m.one_percent_rule_ratio)?;
        w.put(Field::MeetsOnePercentRule, m.meets_one_percent_rule)?;
        w.put(Field::NetOperatingIncome, m.net_operating_income)?;
        w.put(Field::CapRate, m.cap_rate)?;
        w.put(Field::MonthlyCashFlow, m.monthly_cash_flow)?;
        w.put_opt(Field::CashOnCashReturn, m.cash_on_cash_return)?;
        w.put_opt(Field::RoiProjected5Year, m.roi_projected_5year)?;
        w.put(Field::InvestmentGrade, m.investment_grade.as_str())?;
        Ok(true)
    }

    fn apply_changes(
        &self,
        listing: &ListingSnapshot,
        repo: &ListingRepository<'_, S>,
        w: &mut FieldWriter<'_, '_, S>,
        now: DateTime<Utc>,
    ) -> EnrichResult<ChangeOutcome> {
        let state = TrackedState::load(repo)?;
        let outcome = ChangeTracker::track(&state, listing.price, listing.listing_status.as_deref(), now);

        w.put_opt(Field::OriginalPrice, outcome.original_price)?;
        w.put_opt(Field::PriceChangeCount, outcome.price_change_count)?;
        w.put_opt(Field::PriceHistory, outcome.price_history.clone().map(FieldValue::History))?;
        w.put_opt(Field::LastPriceChangeDate, outcome.last_price_change_date)?;
        w.put_opt(Field::PreviousPrice, outcome.previous_price)?;
        w.put_opt(Field::StatusChangeDate, outcome.status_change_date)?;
        w.put_opt(Field::PreviousStatus, outcome.previous_status.clone())?;

        if let Some(history) = &outcome.price_history {
            if let Some(latest) = history.last() {
                info!(
                    listing_id = listing.listing_id,
                    old_price = latest.old_price,
                    new_price = latest.new_price,
                    change_percent = latest.change_percent,
                    reduction = latest.is_reduction(),
                    "price change recorded"
                );
            }
        }
        Ok(outcome)
    }

    fn apply_derived(
        &self,
        listing: &ListingSnapshot,
        f: &FinancialSummary,
        w: &mut FieldWriter<'_, '_, S>,
        now: DateTime<Utc>,
    ) -> EnrichResult<()> {
        w.put_opt(Field::DaysOnMarket, derived::days_on_market(listing.list_date, now))?;

        let street = listing.street_address.as_deref().map(|raw| clean_street(raw).0);
        w.put_opt(
            Field::SeoTitle,
            derived::seo_title(&SeoInputs {
                street: street.as_deref(),
                city: listing.city.as_deref(),
                state: listing.state.as_deref(),
                bedrooms: listing.bedrooms,
                bathrooms: f.bathrooms_total,
                price: listing.positive_price(),
            }),
        )?;

        w.put_opt(
            Field::MarketPosition,
            derived::market_position(
                listing.positive_price(),
                listing.estimated_market_value,
                listing.comparable_sales_avg_price,
            )
            .map(|p| p.as_str()),
        )?;
        Ok(())
    }
}
