//! Data models for valuation reports.
//!
//! This module contains the report records built from aggregated source
//! readings, and the calculations derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PE ladder tiers, as percentages of the benchmark yield's fair PE.
pub const PE_TIERS: [f64; 5] = [50.0, 75.0, 100.0, 125.0, 150.0];

/// Price-to-earnings ratio implied by a yield at a given tier.
///
/// A yield of 4% implies a 100% tier PE of 25.
pub fn pe_at(tier: f64, yield_pct: f64) -> f64 {
    tier / yield_pct
}

/// Qualitative band for a CAPE premium over fair PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationBand {
    /// Premium above 50%
    Overvalued,
    /// Premium above 20% up to 50%
    SlightlyAboveFair,
    /// Premium above -10% up to 20%
    FairRange,
    /// Premium at or below -10%
    Undervalued,
}

impl ValuationBand {
    /// Classify a premium percentage. Every cutoff is exclusive on the low side.
    pub fn from_premium(premium: f64) -> Self {
        if premium > 50.0 {
            ValuationBand::Overvalued
        } else if premium > 20.0 {
            ValuationBand::SlightlyAboveFair
        } else if premium > -10.0 {
            ValuationBand::FairRange
        } else {
            ValuationBand::Undervalued
        }
    }

    /// Returns a short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ValuationBand::Overvalued => "overvalued",
            ValuationBand::SlightlyAboveFair => "slightly above fair",
            ValuationBand::FairRange => "fair range",
            ValuationBand::Undervalued => "undervalued",
        }
    }

    /// Returns an emoji representation of the band.
    pub fn emoji(&self) -> &'static str {
        match self {
            ValuationBand::Overvalued => "⚠️",
            ValuationBand::SlightlyAboveFair => "📊",
            ValuationBand::FairRange => "✅",
            ValuationBand::Undervalued => "🎯",
        }
    }

    /// One-line verdict printed below the CAPE table.
    pub fn verdict(&self) -> &'static str {
        match self {
            ValuationBand::Overvalued => "Market valuation is high, be cautious",
            ValuationBand::SlightlyAboveFair => "Market valuation is slightly above fair",
            ValuationBand::FairRange => "Market valuation is within the fair range",
            ValuationBand::Undervalued => "Market valuation is low, there may be opportunities",
        }
    }
}

impl fmt::Display for ValuationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Yields used by the `pe` command. BAA is only fetched on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeReport {
    /// 10-year treasury yield, percent.
    pub treasury: f64,
    /// Moody's AAA corporate bond yield, percent.
    pub aaa: f64,
    /// Moody's BAA corporate bond yield, percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baa: Option<f64>,
}

impl PeReport {
    /// Returns the benchmarks in display order as (name, yield) pairs.
    pub fn benchmarks(&self) -> Vec<(&'static str, f64)> {
        let mut benchmarks = vec![("10Y Treasury", self.treasury), ("AAA", self.aaa)];
        if let Some(baa) = self.baa {
            benchmarks.push(("BAA", baa));
        }
        benchmarks
    }
}

/// The three benchmark yields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldSnapshot {
    pub treasury: f64,
    pub aaa: f64,
    pub baa: f64,
}

impl YieldSnapshot {
    /// Returns the benchmarks in display order as (name, yield) pairs.
    pub fn benchmarks(&self) -> [(&'static str, f64); 3] {
        [
            ("10Y Treasury", self.treasury),
            ("AAA", self.aaa),
            ("BAA", self.baa),
        ]
    }
}

/// Shiller CAPE compared with the treasury-implied fair PE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapeValuation {
    pub cape: f64,
    pub treasury: f64,
    pub fair_pe: f64,
    /// Premium of CAPE over fair PE, percent. Negative means a discount.
    pub premium: f64,
    pub band: ValuationBand,
}

impl CapeValuation {
    /// Compute the valuation from a CAPE ratio and the treasury yield.
    pub fn new(cape: f64, treasury: f64) -> Self {
        let fair_pe = pe_at(100.0, treasury);
        let premium = (cape - fair_pe) / fair_pe * 100.0;

        Self {
            cape,
            treasury,
            fair_pe,
            premium,
            band: ValuationBand::from_premium(premium),
        }
    }
}

/// A currency conversion query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeQuery {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl ExchangeQuery {
    /// Create a query, normalizing currency codes to upper case and the
    /// amount to whole cents (the precision sent upstream).
    pub fn new(from: &str, to: &str, amount: f64) -> Self {
        Self {
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
            amount: round_cents(amount),
        }
    }
}

/// Round an amount to two decimals.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Result of a currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub from: String,
    pub to: String,
    /// Units of `to` per unit of `from`.
    pub rate: f64,
    pub amount: f64,
    pub converted: f64,
    /// Publication date reported by the upstream API.
    pub date: String,
}

/// Everything shown by the `daily` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub yields: YieldSnapshot,
    pub valuation: CapeValuation,
    pub exchange: ExchangeResult,
}

/// Currency codes offered in help text and used for sanity warnings.
pub const COMMON_CURRENCIES: [&str; 10] = [
    "USD", "EUR", "CNY", "JPY", "GBP", "AUD", "CAD", "CHF", "HKD", "SGD",
];

/// Returns true if the code is one of [`COMMON_CURRENCIES`].
pub fn is_common_currency(code: &str) -> bool {
    COMMON_CURRENCIES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ValuationBand::from_premium(50.0), ValuationBand::SlightlyAboveFair);
        assert_eq!(ValuationBand::from_premium(50.01), ValuationBand::Overvalued);
        assert_eq!(ValuationBand::from_premium(20.0), ValuationBand::FairRange);
        assert_eq!(ValuationBand::from_premium(20.01), ValuationBand::SlightlyAboveFair);
        assert_eq!(ValuationBand::from_premium(-10.0), ValuationBand::Undervalued);
        assert_eq!(ValuationBand::from_premium(-9.99), ValuationBand::FairRange);
        assert_eq!(ValuationBand::from_premium(0.0), ValuationBand::FairRange);
        assert_eq!(ValuationBand::from_premium(-40.0), ValuationBand::Undervalued);
    }

    #[test]
    fn test_band_labels() {
        assert_eq!(ValuationBand::Overvalued.label(), "overvalued");
        assert_eq!(ValuationBand::SlightlyAboveFair.label(), "slightly above fair");
        assert_eq!(ValuationBand::FairRange.to_string(), "fair range");
        assert_eq!(ValuationBand::Undervalued.label(), "undervalued");
    }

    #[test]
    fn test_cape_valuation() {
        let valuation = CapeValuation::new(30.0, 4.5);

        assert!((valuation.fair_pe - 22.22).abs() < 0.01);
        assert!(valuation.premium > 34.8 && valuation.premium < 35.1);
        assert_eq!(valuation.band, ValuationBand::SlightlyAboveFair);
    }

    #[test]
    fn test_cape_discount() {
        let valuation = CapeValuation::new(15.0, 4.0);

        assert_eq!(valuation.fair_pe, 25.0);
        assert_eq!(valuation.premium, -40.0);
        assert_eq!(valuation.band, ValuationBand::Undervalued);
    }

    #[test]
    fn test_pe_ladder() {
        assert_eq!(pe_at(100.0, 4.0), 25.0);
        assert_eq!(pe_at(50.0, 5.0), 10.0);
        assert_eq!(pe_at(150.0, 5.0), 30.0);
    }

    #[test]
    fn test_pe_report_benchmarks() {
        let report = PeReport {
            treasury: 4.5,
            aaa: 5.0,
            baa: None,
        };
        assert_eq!(report.benchmarks().len(), 2);

        let with_baa = PeReport {
            baa: Some(5.5),
            ..report
        };
        assert_eq!(with_baa.benchmarks()[2], ("BAA", 5.5));
    }

    #[test]
    fn test_exchange_query_normalizes() {
        let query = ExchangeQuery::new(" usd", "cny ", 1.0);
        assert_eq!(query.from, "USD");
        assert_eq!(query.to, "CNY");
    }

    #[test]
    fn test_exchange_query_rounds_to_cents() {
        assert_eq!(ExchangeQuery::new("USD", "CNY", 1.234).amount, 1.23);
        assert_eq!(ExchangeQuery::new("USD", "CNY", 2.005_1).amount, 2.01);
        assert_eq!(ExchangeQuery::new("USD", "CNY", 0.004).amount, 0.0);
    }

    #[test]
    fn test_common_currencies() {
        assert!(is_common_currency("USD"));
        assert!(is_common_currency("SGD"));
        assert!(!is_common_currency("XYZ"));
    }
}
