//! Regressive withholding tax on fixed-income gains
//!
//! The rate depends only on how long the money stayed invested:
//! - Up to 180 days: 22.5%
//! - 181 to 360 days: 20%
//! - 361 to 720 days: 17.5%
//! - Above 720 days: 15%

use serde::{Deserialize, Serialize};

/// Every month is counted as exactly 30 days
pub const DAYS_PER_MONTH: u32 = 30;

/// One row of the withholding schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Maximum elapsed days covered by this bracket (inclusive), `None` = unbounded
    pub max_days: Option<u32>,
    /// Tax rate applied to the gain
    pub rate: f64,
}

impl TaxBracket {
    fn covers(&self, elapsed_days: u32) -> bool {
        self.max_days.map_or(true, |max| elapsed_days <= max)
    }
}

/// Regressive schedule, ordered by holding period
pub const REGRESSIVE_BRACKETS: [TaxBracket; 4] = [
    TaxBracket { max_days: Some(180), rate: 0.225 },
    TaxBracket { max_days: Some(360), rate: 0.20 },
    TaxBracket { max_days: Some(720), rate: 0.175 },
    TaxBracket { max_days: None, rate: 0.15 },
];

/// Withholding rate for a gain held `elapsed_days` days
pub fn resolve_tax_rate(elapsed_days: u32) -> f64 {
    REGRESSIVE_BRACKETS
        .iter()
        .find(|bracket| bracket.covers(elapsed_days))
        .map(|bracket| bracket.rate)
        .unwrap_or(0.15)
}

/// Withholding rate for a gain held `months` whole months, zero when exempt
pub fn withholding_rate(months: u32, tax_exempt: bool) -> f64 {
    if tax_exempt {
        return 0.0;
    }
    resolve_tax_rate(months.saturating_mul(DAYS_PER_MONTH))
}
