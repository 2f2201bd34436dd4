//! Per-installment discounting under compounding and withholding tax
//!
//! Investing `pv` today for `n` months at monthly rate `r` gives `pv * (1+r)^n` gross.
//! Only the gain is taxed at `t`, so the net amount is
//!
//! ```text
//! net = pv * (1+r)^n - (pv * (1+r)^n - pv) * t
//!     = pv * [(1+r)^n * (1-t) + t]
//! ```
//!
//! Setting `net` equal to the installment gives `pv = fv / [(1+r)^n * (1-t) + t]`.
//! Both the headline calculation and the trajectory seed go through `installment_values`.

use serde::Serialize;

use crate::tax::{withholding_rate, DAYS_PER_MONTH};
use super::input::{CalculationInput, FIRST_PAYMENT_MONTH, SAFETY_MARGIN_FACTOR};

/// Whether the safety margin shrinks the rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginPolicy {
    /// Honor `CalculationInput::safety_margin` (headline value)
    Apply,
    /// Always use the nominal rate (trajectory display)
    Ignore,
}

/// Discounting detail for a single installment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentValue {
    /// Zero-based installment index
    pub index: u32,
    /// Month the installment is paid
    pub month: u32,
    /// Holding period in days (30 per month)
    pub elapsed_days: u32,
    /// Annual rate after margin and trend drift
    pub annual_rate: f64,
    pub monthly_rate: f64,
    /// Withholding rate on the gain at withdrawal
    pub tax_rate: f64,
    /// Installment amount (the future value to fund)
    pub amount: f64,
    /// Amount to invest today for this installment
    pub present_value: f64,
}

/// Annual rate before trend drift
pub(crate) fn base_annual_rate(input: &CalculationInput, policy: MarginPolicy) -> f64 {
    match policy {
        MarginPolicy::Apply if input.safety_margin => input.annual_rate * SAFETY_MARGIN_FACTOR,
        _ => input.annual_rate,
    }
}

/// `(1 + monthly_rate)^months`
///
/// `powi` takes an `i32` exponent; longer horizons fall back to `powf`.
pub(crate) fn growth_multiplier(monthly_rate: f64, months: u32) -> f64 {
    match i32::try_from(months) {
        Ok(n) => (1.0 + monthly_rate).powi(n),
        Err(_) => (1.0 + monthly_rate).powf(months as f64),
    }
}

/// Amount to invest today so that `amount` is available net of tax after `months`
pub fn discount_installment(amount: f64, monthly_rate: f64, months: u32, tax_rate: f64) -> f64 {
    if monthly_rate == 0.0 {
        return amount;
    }

    let gross = growth_multiplier(monthly_rate, months);
    let net = gross * (1.0 - tax_rate) + tax_rate;

    // An overflowed multiplier means this installment needs nothing today
    if net.is_infinite() {
        return 0.0;
    }
    amount / net
}

/// Discounting detail for every installment, in payment order
///
/// Degenerate inputs yield nothing.
pub fn installment_values(
    input: &CalculationInput,
    policy: MarginPolicy,
) -> impl Iterator<Item = InstallmentValue> {
    let count = if input.is_degenerate() { 0 } else { input.installment_count };
    let amount = input.installment_amount();
    let base_rate = base_annual_rate(input, policy);
    let trend = input.rate_trend;
    let tax_exempt = input.tax_exempt;

    (0..count).map(move |index| {
        let month = index.saturating_add(FIRST_PAYMENT_MONTH);
        let annual_rate = trend.adjust(base_rate, month);
        let monthly_rate = annual_rate / 12.0;
        let tax_rate = withholding_rate(month, tax_exempt);

        InstallmentValue {
            index,
            month,
            elapsed_days: month.saturating_mul(DAYS_PER_MONTH),
            annual_rate,
            monthly_rate,
            tax_rate,
            amount,
            present_value: discount_installment(amount, monthly_rate, month, tax_rate),
        }
    })
}
