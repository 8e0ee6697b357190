// src/domain/listing.rs

use crate::domain::changes::PriceHistoryEntry;
use crate::domain::fields::Field;
use crate::errors::EnrichResult;
use crate::store::{ListingRepository, ListingStore};
use chrono::NaiveDate;

/// The raw inputs of a listing as read at the start of an enrichment pass.
/// This is the only shape the calculators see; they never touch the store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub listing_id: i64,

    // Address
    pub street_address: Option<String>,
    pub unit_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,

    // Details
    pub price: Option<f64>,
    pub square_footage: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms_full: Option<f64>,
    pub bathrooms_half: Option<f64>,
    pub lot_size_acres: Option<f64>,
    pub list_date: Option<NaiveDate>,
    pub listing_status: Option<String>,

    // Financing
    pub down_payment_percent: Option<f64>,
    pub interest_rate: Option<f64>,
    pub loan_term_years: Option<f64>,
    pub hoa_fee_monthly: Option<f64>,
    pub hoa_fee_quarterly: Option<f64>,
    pub hoa_fee_annual: Option<f64>,
    pub property_tax_monthly: Option<f64>,
    pub insurance_monthly: Option<f64>,
    pub pmi_monthly: Option<f64>,

    // Investment & market
    pub estimated_monthly_rent: Option<f64>,
    pub appreciation_rate: Option<f64>,
    pub estimated_market_value: Option<f64>,
    pub comparable_sales_avg_price: Option<f64>,
}

impl ListingSnapshot {
    pub fn load<S: ListingStore + ?Sized>(repo: &ListingRepository<'_, S>) -> EnrichResult<Self> {
        Ok(Self {
            listing_id: repo.listing_id(),
            street_address: repo.text(Field::StreetAddress)?,
            unit_number: repo.text(Field::UnitNumber)?,
            city: repo.text(Field::City)?,
            state: repo.text(Field::State)?,
            zip_code: repo.text(Field::ZipCode)?,
            price: repo.number(Field::Price)?,
            square_footage: repo.number(Field::SquareFootage)?,
            bedrooms: repo.number(Field::Bedrooms)?,
            bathrooms_full: repo.number(Field::BathroomsFull)?,
            bathrooms_half: repo.number(Field::BathroomsHalf)?,
            lot_size_acres: repo.number(Field::LotSizeAcres)?,
            list_date: repo.date(Field::ListDate)?,
            listing_status: repo.text(Field::ListingStatus)?,
            down_payment_percent: repo.number(Field::DownPaymentPercent)?,
            interest_rate: repo.number(Field::InterestRate)?,
            loan_term_years: repo.number(Field::LoanTermYears)?,
            hoa_fee_monthly: repo.number(Field::HoaFeeMonthly)?,
            hoa_fee_quarterly: repo.number(Field::HoaFeeQuarterly)?,
            hoa_fee_annual: repo.number(Field::HoaFeeAnnual)?,
            property_tax_monthly: repo.number(Field::PropertyTaxMonthly)?,
            insurance_monthly: repo.number(Field::InsuranceMonthly)?,
            pmi_monthly: repo.number(Field::PmiMonthly)?,
            estimated_monthly_rent: repo.number(Field::EstimatedMonthlyRent)?,
            appreciation_rate: repo.number(Field::AppreciationRate)?,
            estimated_market_value: repo.number(Field::EstimatedMarketValue)?,
            comparable_sales_avg_price: repo.number(Field::ComparableSalesAvgPrice)?,
        })
    }

    /// The listing price, only when it is a usable positive amount.
    pub fn positive_price(&self) -> Option<f64> {
        self.price.filter(|p| *p > 0.0)
    }

    /// True when at least one of the four geocodable address fields is set.
    pub fn has_address(&self) -> bool {
        self.street_address.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.zip_code.is_some()
    }
}

/// The tracker state ChangeTracker compares against, read from the
/// guard-once fields and the auxiliary trackers.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrackedState {
    pub original_price: Option<f64>,
    pub previous_price: Option<f64>,
    pub previous_status: Option<String>,
    pub price_change_count: i64,
    pub price_history: Vec<PriceHistoryEntry>,
}

impl TrackedState {
    pub fn load<S: ListingStore + ?Sized>(repo: &ListingRepository<'_, S>) -> EnrichResult<Self> {
        let price_history = repo
            .raw(Field::PriceHistory)?
            .and_then(|v| v.as_history().map(|h| h.to_vec()))
            .unwrap_or_default();

        Ok(Self {
            original_price: repo.number(Field::OriginalPrice)?,
            previous_price: repo.number(Field::PreviousPrice)?,
            previous_status: repo.text(Field::PreviousStatus)?,
            price_change_count: repo
                .number(Field::PriceChangeCount)?
                .map(|n| n as i64)
                .unwrap_or(0),
            price_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn snapshot_reads_inputs_from_the_store() {
        let store = InMemoryStore::new();
        let repo = ListingRepository::new(&store, 3);
        repo.set(Field::Price, 350_000.0).unwrap();
        repo.set(Field::StreetAddress, "12 Oak Ave").unwrap();
        repo.set(Field::Bedrooms, 3_i64).unwrap();
        repo.set(Field::ListDate, "2024-05-01").unwrap();

        let snap = ListingSnapshot::load(&repo).unwrap();
        assert_eq!(snap.listing_id, 3);
        assert_eq!(snap.positive_price(), Some(350_000.0));
        assert_eq!(snap.street_address.as_deref(), Some("12 Oak Ave"));
        assert_eq!(snap.bedrooms, Some(3.0));
        assert_eq!(snap.list_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(snap.has_address());
    }

    #[test]
    fn zero_price_is_not_positive() {
        let snap = ListingSnapshot {
            price: Some(0.0),
            ..Default::default()
        };
        assert_eq!(snap.positive_price(), None);
        assert!(!snap.has_address());
    }

    #[test]
    fn tracked_state_defaults_when_nothing_stored() {
        let store = InMemoryStore::new();
        let repo = ListingRepository::new(&store, 9);
        let state = TrackedState::load(&repo).unwrap();
        assert_eq!(state, TrackedState::default());
    }
}
