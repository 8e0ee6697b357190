// src/domain/derived.rs

use crate::domain::financial::round_to;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;

/// Where the asking price sits relative to the market comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPosition {
    Underpriced,
    FairValue,
    Overpriced,
    Premium,
}

impl MarketPosition {
    /// Buckets a percent difference from the comparison value.
    pub fn from_percent_diff(diff: f64) -> Self {
        match diff {
            d if d <= -10.0 => MarketPosition::Underpriced,
            d if d <= 5.0 => MarketPosition::FairValue,
            d if d < 15.0 => MarketPosition::Overpriced,
            _ => MarketPosition::Premium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarketPosition::Underpriced => "underpriced",
            MarketPosition::FairValue => "fair_value",
            MarketPosition::Overpriced => "overpriced",
            MarketPosition::Premium => "premium",
        }
    }
}

impl fmt::Display for MarketPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares the price with the estimated market value, falling back to the
/// average of comparable sales.
pub fn market_position(
    price: Option<f64>,
    estimated_market_value: Option<f64>,
    comparable_sales_avg: Option<f64>,
) -> Option<MarketPosition> {
    let price = price.filter(|p| *p > 0.0)?;
    let comparison = estimated_market_value
        .filter(|v| *v > 0.0)
        .or_else(|| comparable_sales_avg.filter(|v| *v > 0.0))?;

    // Rounded so that exactly +15% lands in the premium bucket.
    let diff = round_to((price - comparison) / comparison * 100.0, 2);
    Some(MarketPosition::from_percent_diff(diff))
}

fn present(part: Option<&str>) -> Option<&str> {
    part.map(str::trim).filter(|s| !s.is_empty())
}

/// Street line with the unit appended: "12 Oak Ave Unit 3", "12 Oak Ave #3".
pub fn full_street_address(street: Option<&str>, unit: Option<&str>) -> Option<String> {
    let street = present(street)?;
    Some(match present(unit) {
        Some(unit) if unit.starts_with('#') => format!("{street} {unit}"),
        Some(unit) => format!("{street} Unit {unit}"),
        None => street.to_string(),
    })
}

/// "12 Oak Ave Unit 3, Austin, TX 78701", skipping whatever is missing.
pub fn full_address(
    street: Option<&str>,
    unit: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    zip: Option<&str>,
) -> Option<String> {
    let state_zip: Vec<&str> = [present(state), present(zip)].into_iter().flatten().collect();
    let state_zip = (!state_zip.is_empty()).then(|| state_zip.join(" "));

    let parts: Vec<String> = [
        full_street_address(street, unit),
        present(city).map(str::to_string),
        state_zip,
    ]
    .into_iter()
    .flatten()
    .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Formats a price with thousands separators and no cents: 1234567 -> "1,234,567".
pub fn format_price(price: f64) -> String {
    let whole = price.round().abs() as u64;
    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if price < 0.0 && whole > 0 {
        out.insert(0, '-');
    }
    out
}

// 3.0 -> "3", 2.5 -> "2.5"
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SeoInputs<'a> {
    pub street: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub price: Option<f64>,
}

/// "3 Bed 2.5 Bath Home for Sale at 12 Oak Ave, Austin, TX - $450,000".
/// Only produced when both city and price are known.
pub fn seo_title(inputs: &SeoInputs<'_>) -> Option<String> {
    let city = present(inputs.city)?;
    let price = inputs.price.filter(|p| *p > 0.0)?;

    let mut title = String::new();
    if let Some(beds) = inputs.bedrooms.filter(|b| *b > 0.0) {
        title.push_str(&format!("{} Bed ", format_count(beds)));
    }
    if let Some(baths) = inputs.bathrooms.filter(|b| *b > 0.0) {
        title.push_str(&format!("{} Bath ", format_count(baths)));
    }
    title.push_str("Home for Sale");

    let location: Vec<&str> = [present(inputs.street), Some(city), present(inputs.state)]
        .into_iter()
        .flatten()
        .collect();
    title.push_str(&format!(" at {}", location.join(", ")));
    title.push_str(&format!(" - ${}", format_price(price)));
    Some(title)
}

/// Whole days since the listing date, never negative.
pub fn days_on_market(list_date: Option<NaiveDate>, now: DateTime<Utc>) -> Option<i64> {
    let listed = list_date?.and_time(NaiveTime::MIN).and_utc();
    Some(now.signed_duration_since(listed).num_days().max(0))
}
