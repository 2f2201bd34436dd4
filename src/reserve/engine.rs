//! Headline present value of an installment plan

use log::debug;
use serde::Serialize;

use super::discount::{installment_values, InstallmentValue, MarginPolicy};
use super::input::CalculationInput;

/// Total amount to invest today to pay every installment
///
/// Returns 0 when `total <= 0` or there are no installments; callers should read
/// that as "not enough information yet", not as a failure.
pub fn compute_present_value(input: &CalculationInput) -> f64 {
    installment_values(input, MarginPolicy::Apply)
        .map(|value| value.present_value)
        .sum()
}

/// Per-installment breakdown behind `compute_present_value`
pub fn present_value_schedule(input: &CalculationInput) -> Vec<InstallmentValue> {
    installment_values(input, MarginPolicy::Apply).collect()
}

/// Headline figures shown to the borrower
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveQuote {
    pub installment_amount: f64,
    pub present_value: f64,
    /// Part of the total paid by investment income (`total - present_value`)
    pub savings: f64,
}

impl ReserveQuote {
    pub fn from_input(input: &CalculationInput) -> Self {
        let present_value = compute_present_value(input);
        let savings = if present_value > 0.0 { input.total - present_value } else { 0.0 };

        debug!(
            "quote: total={:.2} installments={} rate={:.4} trend={} margin={} exempt={} -> pv={:.2}",
            input.total,
            input.installment_count,
            input.annual_rate,
            input.rate_trend.label(),
            input.safety_margin,
            input.tax_exempt,
            present_value,
        );

        Self {
            installment_amount: input.installment_amount(),
            present_value,
            savings,
        }
    }
}
