// src/domain/financial.rs

use crate::domain::listing::ListingSnapshot;

pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Below this down payment (percent of price) lenders charge PMI.
pub const PMI_DOWN_PAYMENT_THRESHOLD: f64 = 20.0;
/// Estimated annual PMI as a percent of the loan amount.
pub const PMI_ANNUAL_RATE: f64 = 0.5;

/// Rounds to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

pub fn price_per_sqft(price: Option<f64>, sqft: Option<f64>) -> Option<f64> {
    let (price, sqft) = (positive(price)?, positive(sqft)?);
    Some(round_money(price / sqft))
}

/// Full baths plus half baths counted as one half. An absent side counts as
/// zero, but at least one side must be present.
pub fn bathrooms_total(full: Option<f64>, half: Option<f64>) -> Option<f64> {
    if full.is_none() && half.is_none() {
        return None;
    }
    Some(full.unwrap_or(0.0) + half.unwrap_or(0.0) * 0.5)
}

pub fn lot_sqft(acres: Option<f64>) -> Option<i64> {
    positive(acres).map(|a| (a * SQFT_PER_ACRE).round() as i64)
}

pub fn down_payment(price: Option<f64>, percent: Option<f64>) -> Option<f64> {
    let price = positive(price)?;
    let percent = percent.filter(|p| (0.0..=100.0).contains(p))?;
    Some(round_money(price * percent / 100.0))
}

pub fn loan_amount(price: Option<f64>, down_payment: Option<f64>) -> Option<f64> {
    let price = positive(price)?;
    let down = down_payment.filter(|d| *d >= 0.0 && *d <= price)?;
    Some(round_money(price - down))
}

/// Monthly principal and interest for a fully amortizing loan:
/// `M = L·r(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate and `n` the
/// number of payments. A zero rate divides the loan evenly.
pub fn monthly_payment(loan: Option<f64>, annual_rate: Option<f64>, term_years: Option<f64>) -> Option<f64> {
    let loan = positive(loan)?;
    let annual_rate = annual_rate.filter(|r| r.is_finite() && *r >= 0.0)?;
    let n = positive(term_years)? * 12.0;

    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return Some(round_money(loan / n));
    }

    let growth = (1.0 + r).powf(n);
    Some(round_money(loan * r * growth / (growth - 1.0)))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoaTotals {
    pub monthly: f64,
    pub annual: f64,
}

/// Folds monthly, quarterly and annual HOA dues into one monthly and one
/// annual figure. Returns `None` when no dues are recorded at all.
pub fn hoa_normalize(monthly: Option<f64>, quarterly: Option<f64>, annual: Option<f64>) -> Option<HoaTotals> {
    if monthly.is_none() && quarterly.is_none() && annual.is_none() {
        return None;
    }
    let total_monthly = monthly.unwrap_or(0.0) + quarterly.unwrap_or(0.0) / 3.0 + annual.unwrap_or(0.0) / 12.0;
    Some(HoaTotals {
        monthly: round_money(total_monthly),
        annual: round_money(total_monthly * 12.0),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyCost {
    /// Principal, interest, taxes and insurance.
    pub piti: f64,
    /// PITI plus HOA dues and PMI.
    pub total: f64,
}

pub fn total_monthly_cost(
    payment: Option<f64>,
    taxes: Option<f64>,
    insurance: Option<f64>,
    hoa: Option<f64>,
    pmi: Option<f64>,
) -> Option<MonthlyCost> {
    let payment = payment?;
    let piti = payment + taxes.unwrap_or(0.0) + insurance.unwrap_or(0.0);
    let total = piti + hoa.unwrap_or(0.0) + pmi.unwrap_or(0.0);
    Some(MonthlyCost {
        piti: round_money(piti),
        total: round_money(total),
    })
}

/// Monthly PMI estimate for loans with less than 20% down.
pub fn estimate_pmi(loan: Option<f64>, down_payment_percent: Option<f64>) -> Option<f64> {
    let loan = positive(loan)?;
    let percent = down_payment_percent?;
    if percent >= PMI_DOWN_PAYMENT_THRESHOLD {
        return None;
    }
    Some(round_money(loan * PMI_ANNUAL_RATE / 100.0 / 12.0))
}

/// Everything the financing stage writes, computed from one snapshot.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FinancialSummary {
    pub price_per_sqft: Option<f64>,
    pub bathrooms_total: Option<f64>,
    pub lot_sqft: Option<i64>,
    pub down_payment_amount: Option<f64>,
    pub loan_amount: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub hoa: Option<HoaTotals>,
    pub pmi_monthly: Option<f64>,
    pub monthly_cost: Option<MonthlyCost>,
}

impl FinancialSummary {
    pub fn compute(listing: &ListingSnapshot) -> Self {
        let down_payment_amount = down_payment(listing.price, listing.down_payment_percent);
        let loan = loan_amount(listing.price, down_payment_amount);
        let payment = monthly_payment(loan, listing.interest_rate, listing.loan_term_years);
        let hoa = hoa_normalize(
            listing.hoa_fee_monthly,
            listing.hoa_fee_quarterly,
            listing.hoa_fee_annual,
        );
        let pmi = listing
            .pmi_monthly
            .or_else(|| estimate_pmi(loan, listing.down_payment_percent));
        let monthly_cost = total_monthly_cost(
            payment,
            listing.property_tax_monthly,
            listing.insurance_monthly,
            hoa.map(|h| h.monthly),
            pmi,
        );

        Self {
            price_per_sqft: price_per_sqft(listing.price, listing.square_footage),
            bathrooms_total: bathrooms_total(listing.bathrooms_full, listing.bathrooms_half),
            lot_sqft: lot_sqft(listing.lot_size_acres),
            down_payment_amount,
            loan_amount: loan,
            monthly_payment: payment,
            hoa,
            pmi_monthly: pmi,
            monthly_cost,
        }
    }

    /// The monthly outlay investors subtract from rent: the full monthly
    /// cost when known, else bare principal and interest.
    pub fn total_monthly_payment(&self) -> Option<f64> {
        self.monthly_cost.map(|c| c.total).or(self.monthly_payment)
    }
}
