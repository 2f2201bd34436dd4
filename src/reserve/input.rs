//! Calculation inputs shared by the engine and the trajectory simulator

use serde::{Deserialize, Serialize};

/// Annual rate used when the caller does not provide one (6%)
pub const DEFAULT_ANNUAL_RATE: f64 = 0.06;

/// Month of the first installment (installments start in month 2)
pub const FIRST_PAYMENT_MONTH: u32 = 2;

/// Multiplier applied to the annual rate when the safety margin is on
pub const SAFETY_MARGIN_FACTOR: f64 = 0.95;

fn default_annual_rate() -> f64 {
    DEFAULT_ANNUAL_RATE
}

/// Scenario for how the reference rate moves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RateTrend {
    /// Rate stays where it is
    #[default]
    Stable,
    /// Rate drops 0.25 pp every full quarter, never below zero
    Falling,
    /// Rate rises 0.25 pp every full quarter
    Rising,
}

impl RateTrend {
    /// Drift per elapsed quarter (0.25 pp)
    pub const QUARTERLY_STEP: f64 = 0.0025;

    pub const ALL: [RateTrend; 3] = [RateTrend::Stable, RateTrend::Falling, RateTrend::Rising];

    /// Annual rate in effect after `months` months
    ///
    /// Quarters are whole: months 0-2 see no drift, months 3-5 one step, and so on.
    pub fn adjust(self, annual_rate: f64, months: u32) -> f64 {
        let quarters = (months / 3) as f64;
        match self {
            RateTrend::Stable => annual_rate,
            RateTrend::Falling => (annual_rate - quarters * Self::QUARTERLY_STEP).max(0.0),
            RateTrend::Rising => annual_rate + quarters * Self::QUARTERLY_STEP,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RateTrend::Stable => "stable",
            RateTrend::Falling => "falling",
            RateTrend::Rising => "rising",
        }
    }
}

/// Inputs for one present-value calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationInput {
    /// Total price to pay
    pub total: f64,

    /// Number of monthly installments
    #[serde(alias = "installments")]
    pub installment_count: u32,

    /// Nominal annual rate as a fraction (0.1175 for 11.75%)
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,

    /// Rate drift scenario
    #[serde(default)]
    pub rate_trend: RateTrend,

    /// Shrink the rate by 5% before computing the headline value
    #[serde(default)]
    pub safety_margin: bool,

    /// Skip withholding tax entirely (LCI/LCA)
    #[serde(default)]
    pub tax_exempt: bool,
}

impl CalculationInput {
    /// Create an input with the default rate and no scenario adjustments
    pub fn new(total: f64, installment_count: u32) -> Self {
        Self {
            total,
            installment_count,
            annual_rate: DEFAULT_ANNUAL_RATE,
            rate_trend: RateTrend::Stable,
            safety_margin: false,
            tax_exempt: false,
        }
    }

    pub fn with_rate(mut self, annual_rate: f64) -> Self {
        self.annual_rate = annual_rate;
        self
    }

    pub fn with_trend(mut self, rate_trend: RateTrend) -> Self {
        self.rate_trend = rate_trend;
        self
    }

    pub fn with_safety_margin(mut self, safety_margin: bool) -> Self {
        self.safety_margin = safety_margin;
        self
    }

    pub fn with_tax_exempt(mut self, tax_exempt: bool) -> Self {
        self.tax_exempt = tax_exempt;
        self
    }

    /// True when the inputs cannot produce a meaningful result
    ///
    /// Callers get zero (or an empty series) back instead of an error.
    pub fn is_degenerate(&self) -> bool {
        !self.total.is_finite()
            || self.total <= 0.0
            || self.installment_count == 0
            || !self.annual_rate.is_finite()
    }

    /// Value of each installment, zero for degenerate inputs
    pub fn installment_amount(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.total / self.installment_count as f64
        }
    }
}
