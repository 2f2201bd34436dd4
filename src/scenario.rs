//! Scenario runner for side-by-side comparisons
//!
//! Holds one base input and evaluates it under every rate trend and safety-margin
//! setting, or across a sweep of annual rates, in parallel.

use rayon::prelude::*;
use serde::Serialize;

use crate::reserve::{CalculationInput, RateTrend, ReserveQuote};

/// Result of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub annual_rate: f64,
    pub rate_trend: RateTrend,
    pub safety_margin: bool,
    pub tax_exempt: bool,
    pub present_value: f64,
    pub savings: f64,
}

impl ScenarioOutcome {
    fn evaluate(input: &CalculationInput) -> Self {
        let quote = ReserveQuote::from_input(input);
        Self {
            annual_rate: input.annual_rate,
            rate_trend: input.rate_trend,
            safety_margin: input.safety_margin,
            tax_exempt: input.tax_exempt,
            present_value: quote.present_value,
            savings: quote.savings,
        }
    }
}

/// Scenario runner over a base calculation
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(CalculationInput::new(12_000.0, 12).with_rate(0.1175));
/// for outcome in runner.run_grid() {
///     println!("{:?} margin={} pv={:.2}", outcome.rate_trend, outcome.safety_margin, outcome.present_value);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: CalculationInput,
}

impl ScenarioRunner {
    pub fn new(base: CalculationInput) -> Self {
        Self { base }
    }

    /// Every trend x safety-margin combination, trends in `RateTrend::ALL` order,
    /// margin off before on
    pub fn run_grid(&self) -> Vec<ScenarioOutcome> {
        let inputs: Vec<CalculationInput> = RateTrend::ALL
            .iter()
            .flat_map(|&trend| {
                [false, true].map(|margin| self.base.with_trend(trend).with_safety_margin(margin))
            })
            .collect();

        self.run_inputs(&inputs)
    }

    /// The base scenario at each annual rate (fractions)
    pub fn run_rates(&self, annual_rates: &[f64]) -> Vec<ScenarioOutcome> {
        let inputs: Vec<CalculationInput> = annual_rates
            .iter()
            .map(|&rate| self.base.with_rate(rate))
            .collect();

        self.run_inputs(&inputs)
    }

    /// Evaluate arbitrary inputs, preserving order
    pub fn run_inputs(&self, inputs: &[CalculationInput]) -> Vec<ScenarioOutcome> {
        inputs.par_iter().map(ScenarioOutcome::evaluate).collect()
    }

    /// Get reference to the base input
    pub fn base(&self) -> &CalculationInput {
        &self.base
    }
}
