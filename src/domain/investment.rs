// src/domain/investment.rs

use crate::domain::financial::{round_money, round_to};
use std::fmt;

/// Share of gross annual rent assumed to go to operating expenses
/// (vacancy, maintenance, management).
pub const OPERATING_EXPENSE_RATIO: f64 = 0.25;
pub const PROJECTION_YEARS: i32 = 5;

/// Inputs the analyzer needs beyond price and rent. These come from the
/// financing stage and the listing itself.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InvestmentInputs {
    pub price: Option<f64>,
    pub monthly_rent: Option<f64>,
    /// Total monthly outlay (mortgage plus carrying costs), if financed.
    pub total_monthly_payment: Option<f64>,
    pub down_payment_amount: Option<f64>,
    /// Annual appreciation in percent.
    pub appreciation_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentMetrics {
    pub gross_rental_yield: f64,
    pub gross_rent_multiplier: f64,
    pub one_percent_rule_ratio: f64,
    pub meets_one_percent_rule: bool,
    pub net_operating_income: f64,
    pub cap_rate: f64,
    pub monthly_cash_flow: f64,
    pub cash_on_cash_return: Option<f64>,
    pub roi_projected_5year: Option<f64>,
    pub investment_grade: InvestmentGrade,
}

/// Letter grade from the weighted cap-rate / cash-flow / yield rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvestmentGrade {
    F,
    D,
    C,
    CPlus,
    B,
    BPlus,
    A,
    APlus,
}

impl InvestmentGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => InvestmentGrade::APlus,
            80..=89 => InvestmentGrade::A,
            70..=79 => InvestmentGrade::BPlus,
            60..=69 => InvestmentGrade::B,
            50..=59 => InvestmentGrade::CPlus,
            40..=49 => InvestmentGrade::C,
            30..=39 => InvestmentGrade::D,
            _ => InvestmentGrade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvestmentGrade::APlus => "A+",
            InvestmentGrade::A => "A",
            InvestmentGrade::BPlus => "B+",
            InvestmentGrade::B => "B",
            InvestmentGrade::CPlus => "C+",
            InvestmentGrade::C => "C",
            InvestmentGrade::D => "D",
            InvestmentGrade::F => "F",
        }
    }
}

impl fmt::Display for InvestmentGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn gross_rental_yield(monthly_rent: f64, price: f64) -> f64 {
    round_to(monthly_rent * 12.0 / price * 100.0, 2)
}

pub fn one_percent_rule_ratio(monthly_rent: f64, price: f64) -> f64 {
    round_to(monthly_rent / price * 100.0, 4)
}

pub fn cap_rate(net_operating_income: f64, price: f64) -> f64 {
    round_to(net_operating_income / price * 100.0, 2)
}

pub fn cash_on_cash_return(monthly_cash_flow: f64, down_payment: f64) -> Option<f64> {
    if down_payment <= 0.0 {
        return None;
    }
    Some(round_to(monthly_cash_flow * 12.0 / down_payment * 100.0, 2))
}

/// Total return over five years (cash flow plus appreciation) relative to
/// the cash invested.
pub fn roi_projected_5year(
    price: f64,
    monthly_cash_flow: f64,
    appreciation_rate: f64,
    down_payment: f64,
) -> Option<f64> {
    if down_payment <= 0.0 {
        return None;
    }
    let appreciation_value = price * (1.0 + appreciation_rate / 100.0).powi(PROJECTION_YEARS) - price;
    let total_return = monthly_cash_flow * 12.0 * PROJECTION_YEARS as f64 + appreciation_value;
    Some(round_to(total_return / down_payment * 100.0, 2))
}

fn cap_rate_points(cap_rate: f64) -> u32 {
    match cap_rate {
        c if c >= 8.0 => 40,
        c if c >= 6.0 => 30,
        c if c >= 4.0 => 20,
        c if c >= 2.0 => 10,
        _ => 0,
    }
}

fn cash_flow_points(monthly_cash_flow: f64) -> u32 {
    match monthly_cash_flow {
        cf if cf >= 500.0 => 40,
        cf if cf >= 200.0 => 30,
        cf if cf >= 0.0 => 20,
        cf if cf >= -200.0 => 10,
        _ => 0,
    }
}

fn yield_points(gross_yield: f64) -> u32 {
    match gross_yield {
        y if y >= 12.0 => 20,
        y if y >= 10.0 => 15,
        y if y >= 8.0 => 10,
        y if y >= 6.0 => 5,
        _ => 0,
    }
}

pub fn investment_score(cap_rate: f64, monthly_cash_flow: f64, gross_yield: f64) -> u32 {
    cap_rate_points(cap_rate) + cash_flow_points(monthly_cash_flow) + yield_points(gross_yield)
}

pub fn investment_grade(cap_rate: f64, monthly_cash_flow: f64, gross_yield: f64) -> InvestmentGrade {
    InvestmentGrade::from_score(investment_score(cap_rate, monthly_cash_flow, gross_yield))
}

/// Runs the full analysis. Nothing is computed unless both price and rent
/// are positive.
pub fn analyze(inputs: &InvestmentInputs) -> Option<InvestmentMetrics> {
    let price = inputs.price.filter(|p| *p > 0.0)?;
    let rent = inputs.monthly_rent.filter(|r| *r > 0.0)?;

    let annual_rent = rent * 12.0;
    let operating_expenses = annual_rent * OPERATING_EXPENSE_RATIO;
    let net_operating_income = annual_rent - operating_expenses;

    let monthly_cash_flow = round_money(
        rent - inputs.total_monthly_payment.unwrap_or(0.0) - operating_expenses / 12.0,
    );

    let gross_yield = gross_rental_yield(rent, price);
    let ratio = one_percent_rule_ratio(rent, price);
    let cap = cap_rate(net_operating_income, price);
    let down = inputs.down_payment_amount.unwrap_or(0.0);

    Some(InvestmentMetrics {
        gross_rental_yield: gross_yield,
        gross_rent_multiplier: round_to(price / annual_rent, 2),
        one_percent_rule_ratio: ratio,
        meets_one_percent_rule: ratio >= 1.0,
        net_operating_income: round_money(net_operating_income),
        cap_rate: cap,
        monthly_cash_flow,
        cash_on_cash_return: cash_on_cash_return(monthly_cash_flow, down),
        roi_projected_5year: roi_projected_5year(price, monthly_cash_flow, inputs.appreciation_rate, down),
        investment_grade: investment_grade(cap, monthly_cash_flow, gross_yield),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_metrics_grade_a_plus() {
        assert_eq!(investment_grade(9.0, 600.0, 13.0), InvestmentGrade::APlus);
        assert_eq!(investment_grade(9.0, 600.0, 13.0).to_string(), "A+");
    }

    #[test]
    fn rubric_bands_map_to_letters() {
        // 30 + 30 + 10
        assert_eq!(investment_grade(6.5, 250.0, 8.5), InvestmentGrade::BPlus);
        // 20 + 20 + 5
        assert_eq!(investment_grade(4.0, 0.0, 6.0), InvestmentGrade::C);
        // 10 + 10 + 0
        assert_eq!(investment_grade(2.0, -200.0, 1.0), InvestmentGrade::F);
        // 10 + 20 + 0
        assert_eq!(investment_grade(3.0, 50.0, 5.0), InvestmentGrade::D);
    }

    #[test]
    fn score_boundaries() {
        assert_eq!(InvestmentGrade::from_score(100), InvestmentGrade::APlus);
        assert_eq!(InvestmentGrade::from_score(90), InvestmentGrade::APlus);
        assert_eq!(InvestmentGrade::from_score(89), InvestmentGrade::A);
        assert_eq!(InvestmentGrade::from_score(50), InvestmentGrade::CPlus);
        assert_eq!(InvestmentGrade::from_score(30), InvestmentGrade::D);
        assert_eq!(InvestmentGrade::from_score(29), InvestmentGrade::F);
    }

    #[test]
    fn one_percent_rule() {
        let ratio = one_percent_rule_ratio(3_200.0, 300_000.0);
        assert!((ratio - 1.0667).abs() < 1e-9);
        assert!(ratio >= 1.0);
        assert!(one_percent_rule_ratio(2_500.0, 300_000.0) < 1.0);
    }

    #[test]
    fn analysis_needs_price_and_rent() {
        let mut inputs = InvestmentInputs {
            price: Some(300_000.0),
            monthly_rent: None,
            ..Default::default()
        };
        assert!(analyze(&inputs).is_none());
        inputs.monthly_rent = Some(0.0);
        assert!(analyze(&inputs).is_none());
        inputs.monthly_rent = Some(2_000.0);
        inputs.price = Some(0.0);
        assert!(analyze(&inputs).is_none());
    }

    #[test]
    fn cash_purchase_has_no_cash_on_cash_return() {
        let metrics = analyze(&InvestmentInputs {
            price: Some(300_000.0),
            monthly_rent: Some(3_200.0),
            ..Default::default()
        })
        .unwrap();

        // 38,400 gross, 9,600 expenses
        assert_eq!(metrics.gross_rental_yield, 12.8);
        assert_eq!(metrics.net_operating_income, 28_800.0);
        assert_eq!(metrics.cap_rate, 9.6);
        assert_eq!(metrics.monthly_cash_flow, 2_400.0);
        assert_eq!(metrics.gross_rent_multiplier, 7.81);
        assert!(metrics.meets_one_percent_rule);
        assert_eq!(metrics.cash_on_cash_return, None);
        assert_eq!(metrics.roi_projected_5year, None);
        assert_eq!(metrics.investment_grade, InvestmentGrade::APlus);
    }

    #[test]
    fn financed_purchase_subtracts_payment_from_cash_flow() {
        let metrics = analyze(&InvestmentInputs {
            price: Some(200_000.0),
            monthly_rent: Some(2_000.0),
            total_monthly_payment: Some(1_200.0),
            down_payment_amount: Some(40_000.0),
            appreciation_rate: 0.0,
        })
        .unwrap();

        // 2000 - 1200 - 500
        assert_eq!(metrics.monthly_cash_flow, 300.0);
        // 3600 / 40000
        assert_eq!(metrics.cash_on_cash_return, Some(9.0));
        // 18000 over five years, no appreciation
        assert_eq!(metrics.roi_projected_5year, Some(45.0));
    }

    #[test]
    fn appreciation_adds_to_projected_roi() {
        let roi = roi_projected_5year(100_000.0, 0.0, 10.0, 10_000.0).unwrap();
        // 100k * 1.1^5 - 100k = 61,051
        assert_eq!(roi, 610.51);
    }

    #[test]
    fn negative_cash_flow_gives_negative_returns() {
        assert_eq!(cash_on_cash_return(-100.0, 60_000.0), Some(-2.0));
        assert_eq!(cash_on_cash_return(100.0, 0.0), None);
    }
}
