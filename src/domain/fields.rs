// src/domain/fields.rs

use crate::domain::changes::PriceHistoryEntry;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Generates the closed `Field` enum together with its storage names, so the
// name table and the variant list can never drift apart.
macro_rules! define_fields {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Every named value the engine reads or writes on a listing.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Field {
            $($variant),*
        }

        impl Field {
            pub const ALL: &'static [Field] = &[$(Field::$variant),*];

            /// The storage key for this field.
            pub fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<Field> {
                match name {
                    $($name => Some(Field::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_fields! {
    // === Raw inputs ===
    Price => "price",
    SquareFootage => "square_footage",
    Bedrooms => "bedrooms",
    BathroomsFull => "bathrooms_full",
    BathroomsHalf => "bathrooms_half",
    LotSizeAcres => "lot_size_acres",
    StreetAddress => "street_address",
    UnitNumber => "unit_number",
    City => "city",
    State => "state",
    ZipCode => "zip_code",
    ListDate => "list_date",
    ListingStatus => "listing_status",
    DownPaymentPercent => "down_payment_percent",
    InterestRate => "interest_rate",
    LoanTermYears => "loan_term_years",
    EstimatedMonthlyRent => "estimated_monthly_rent",
    HoaFeeMonthly => "hoa_fee_monthly",
    HoaFeeQuarterly => "hoa_fee_quarterly",
    HoaFeeAnnual => "hoa_fee_annual",
    PropertyTaxMonthly => "property_tax_monthly",
    InsuranceMonthly => "insurance_monthly",
    PmiMonthly => "pmi_monthly",
    AppreciationRate => "appreciation_rate",
    EstimatedMarketValue => "estimated_market_value",
    ComparableSalesAvgPrice => "comparable_sales_avg_price",

    // === Property metrics ===
    PricePerSqft => "price_per_sqft",
    BathroomsTotal => "bathrooms_total",
    LotSqft => "lot_sqft",
    DaysOnMarket => "days_on_market",

    // === Address components ===
    StreetNumber => "street_number",
    StreetDirPrefix => "street_dir_prefix",
    StreetName => "street_name",
    StreetSuffix => "street_suffix",
    StreetDirSuffix => "street_dir_suffix",
    UnparsedAddress => "unparsed_address",
    FullAddress => "full_address",
    FullStreetAddress => "full_street_address",
    // Legacy aliases read by older consumers
    LegacyAddress => "address",
    LegacyRegion => "region",
    LegacyZip => "zip",

    // === Geocoding ===
    County => "county",
    Latitude => "latitude",
    Longitude => "longitude",
    GeocodingAccuracy => "geocoding_accuracy",
    GeocodingSource => "geocoding_source",
    GeocodedAt => "geocoded_at",

    // === Change tracking ===
    OriginalPrice => "original_price",
    PriceChangeCount => "price_change_count",
    LastPriceChangeDate => "last_price_change_date",
    StatusChangeDate => "status_change_date",
    PriceHistory => "price_history",

    // === Financing ===
    DownPaymentAmount => "down_payment_amount",
    LoanAmount => "loan_amount",
    EstimatedMonthlyPayment => "estimated_monthly_payment",
    PitiPayment => "piti_payment",
    HoaTotalMonthly => "hoa_total_monthly",
    HoaTotalAnnual => "hoa_total_annual",
    TotalMonthlyCost => "total_monthly_cost",

    // === Investment ===
    GrossRentalYield => "gross_rental_yield",
    GrossRentMultiplier => "gross_rent_multiplier",
    OnePercentRuleRatio => "one_percent_rule_ratio",
    MeetsOnePercentRule => "meets_one_percent_rule",
    NetOperatingIncome => "net_operating_income",
    CapRate => "cap_rate",
    CashOnCashReturn => "cash_on_cash_return",
    MonthlyCashFlow => "monthly_cash_flow",
    RoiProjected5Year => "roi_projected_5year",
    InvestmentGrade => "investment_grade",

    // === Display ===
    MarketPosition => "market_position",
    SeoTitle => "seo_title",

    // === Auxiliary trackers (not part of the visible field set) ===
    PreviousPrice => "_previous_price",
    PreviousStatus => "_previous_status",
    GeocodeHash => "_geocode_hash",
    SplitUnit => "_split_unit",
}

impl Field {
    /// Auxiliary fields hold tracker state and are hidden from consumers.
    pub fn is_auxiliary(self) -> bool {
        self.name().starts_with('_')
    }
}

/// A typed value stored under a [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Flag(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    History(Vec<PriceHistoryEntry>),
}

impl FieldValue {
    /// Numeric view. Text is accepted because listing editors often store
    /// numbers as strings such as "$450,000".
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// Text view; blank strings read as absent.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Timestamp(ts) => Some(ts.date_naive()),
            FieldValue::Text(s) => {
                let s = s.trim();
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
                    .or_else(|| NaiveDate::parse_from_str(s, "%m/%d/%Y").ok())
            }
            _ => None,
        }
    }

    pub fn as_history(&self) -> Option<&[PriceHistoryEntry]> {
        match self {
            FieldValue::History(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Flag(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}
