//! Forward simulation of the funding investment
//!
//! The starting balance is the present value without the safety margin; the margin only
//! affects the headline figure, never the chart. From there the balance earns one month
//! of net-of-tax interest per month and pays one installment per month from month 2.

use serde::{Deserialize, Serialize};

use crate::reserve::{installment_values, CalculationInput, MarginPolicy, RateTrend, DEFAULT_ANNUAL_RATE};
use super::chart::ChartPoint;
use super::state::TrajectoryState;

fn default_annual_rate() -> f64 {
    DEFAULT_ANNUAL_RATE
}

/// Trajectory inputs: a `CalculationInput` without the safety margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryInput {
    pub total: f64,
    #[serde(alias = "installments")]
    pub installment_count: u32,
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,
    #[serde(default)]
    pub rate_trend: RateTrend,
    #[serde(default)]
    pub tax_exempt: bool,
}

impl From<&CalculationInput> for TrajectoryInput {
    fn from(input: &CalculationInput) -> Self {
        Self {
            total: input.total,
            installment_count: input.installment_count,
            annual_rate: input.annual_rate,
            rate_trend: input.rate_trend,
            tax_exempt: input.tax_exempt,
        }
    }
}

impl From<CalculationInput> for TrajectoryInput {
    fn from(input: CalculationInput) -> Self {
        Self::from(&input)
    }
}

impl TrajectoryInput {
    fn as_calculation(&self) -> CalculationInput {
        CalculationInput {
            total: self.total,
            installment_count: self.installment_count,
            annual_rate: self.annual_rate,
            rate_trend: self.rate_trend,
            safety_margin: false,
            tax_exempt: self.tax_exempt,
        }
    }

    /// Monthly rate in effect during `month`
    fn monthly_rate(&self, month: u32) -> f64 {
        self.rate_trend.adjust(self.annual_rate, month) / 12.0
    }
}

/// Month-by-month balance, from month 0 through `installment_count + 1`
///
/// Empty when `total <= 0`, there are no installments, or the nominal rate is not positive.
/// One point is allocated per month, so callers taking the count from outside bound it
/// first (`instrument::MAX_INSTALLMENTS`).
pub fn generate_trajectory(input: &TrajectoryInput) -> Vec<ChartPoint> {
    let calculation = input.as_calculation();
    if calculation.is_degenerate() || input.annual_rate / 12.0 <= 0.0 {
        return Vec::new();
    }

    let seed: f64 = installment_values(&calculation, MarginPolicy::Ignore)
        .map(|value| value.present_value)
        .sum();
    let installment = calculation.installment_amount();
    let last_month = input.installment_count.saturating_add(1);

    let mut state = TrajectoryState::new(seed);
    let mut points = Vec::with_capacity(input.installment_count as usize + 2);
    points.push(chart_point(&state));

    // Month 1 only earns: whole quarters start at month 3, so no drift applies yet
    state.advance_month(input.monthly_rate(1), input.tax_exempt);
    points.push(chart_point(&state));

    for month in 2..=last_month {
        state.advance_month(input.monthly_rate(month), input.tax_exempt);
        state.withdraw(installment);
        points.push(chart_point(&state));
    }

    log::debug!(
        "trajectory: seed={:.2} months={} final_balance={:.4} net_earnings={:.2} tax_paid={:.2}",
        seed,
        last_month,
        state.balance,
        state.net_earnings,
        state.tax_paid,
    );

    points
}

fn chart_point(state: &TrajectoryState) -> ChartPoint {
    ChartPoint {
        month: state.month,
        balance: state.display_balance(),
        invested: state.invested,
        withdrawn: state.withdrawn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reserve::compute_present_value;
    use crate::trajectory::TrajectorySummary;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn reference_input() -> CalculationInput {
        CalculationInput::new(12_000.0, 12).with_rate(0.12)
    }

    #[test]
    fn test_point_count_and_months() {
        for &count in &[1, 6, 12, 99] {
            let input = TrajectoryInput::from(CalculationInput::new(5_000.0, count).with_rate(0.1));
            let points = generate_trajectory(&input);

            assert_eq!(points.len(), count as usize + 2);
            for (i, point) in points.iter().enumerate() {
                assert_eq!(point.month, i as u32);
            }
        }
    }

    #[test]
    fn test_withdrawals_accumulate_to_total() {
        let points = generate_trajectory(&reference_input().into());

        assert_eq!(points[0].withdrawn, 0.0);
        assert_eq!(points[1].withdrawn, 0.0);
        assert_relative_eq!(points[2].withdrawn, 1_000.0, max_relative = 1e-12);
        assert_relative_eq!(points[7].withdrawn, 6_000.0, max_relative = 1e-12);
        assert_relative_eq!(points.last().unwrap().withdrawn, 12_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_seed_matches_present_value_without_margin() {
        for trend in RateTrend::ALL {
            let input = reference_input().with_trend(trend).with_safety_margin(true);
            let points = generate_trajectory(&TrajectoryInput::from(&input));

            let seed = compute_present_value(&input.with_safety_margin(false));
            assert_relative_eq!(points[0].balance, seed, max_relative = 1e-12);
            assert!(points.iter().all(|p| p.invested == points[0].invested));

            // The headline value with margin is larger than what the chart starts with
            assert!(compute_present_value(&input) > points[0].balance);
        }
    }

    #[test]
    fn test_first_month_earns_without_drift() {
        let base = reference_input();
        let stable = generate_trajectory(&base.into());
        let falling = generate_trajectory(&base.with_trend(RateTrend::Falling).into());

        let stable_growth = stable[1].balance / stable[0].balance;
        let falling_growth = falling[1].balance / falling[0].balance;

        // 1% gross, 22.5% withheld
        assert_relative_eq!(stable_growth, 1.0 + 0.01 * 0.775, max_relative = 1e-12);
        assert_relative_eq!(falling_growth, stable_growth, max_relative = 1e-12);
        assert_eq!(stable[1].withdrawn, 0.0);
    }

    #[test]
    fn test_exempt_stable_plan_ends_funded() {
        // Without tax or drift, month-by-month compounding matches per-installment discounting
        let input = reference_input().with_tax_exempt(true);
        let points = generate_trajectory(&input.into());

        assert_abs_diff_eq!(points.last().unwrap().balance, 0.0, epsilon = 1e-6);
        assert!(points[..points.len() - 1].iter().all(|p| p.balance > 0.0));
    }

    #[test]
    fn test_balance_never_negative() {
        for trend in RateTrend::ALL {
            for &exempt in &[false, true] {
                let input = reference_input().with_trend(trend).with_tax_exempt(exempt);
                let points = generate_trajectory(&input.into());
                assert!(points.iter().all(|p| p.balance >= 0.0));
            }
        }
    }

    #[test]
    fn test_empty_for_degenerate_inputs() {
        assert!(generate_trajectory(&CalculationInput::new(0.0, 12).into()).is_empty());
        assert!(generate_trajectory(&CalculationInput::new(1_000.0, 0).into()).is_empty());
        assert!(generate_trajectory(&CalculationInput::new(1_000.0, 12).with_rate(0.0).into()).is_empty());
        assert!(generate_trajectory(&CalculationInput::new(1_000.0, 12).with_rate(-0.05).into()).is_empty());
    }

    #[test]
    fn test_summary_of_reference_plan() {
        let points = generate_trajectory(&reference_input().into());
        let summary = TrajectorySummary::from_points(&points);

        assert_eq!(summary.total_months, 13);
        assert_relative_eq!(summary.total_withdrawn, 12_000.0, max_relative = 1e-12);
        assert!(summary.final_balance < 1.0);
    }

    #[test]
    fn test_trajectory_input_from_json() {
        let input: TrajectoryInput =
            serde_json::from_str(r#"{"total": 600, "installments": 6, "taxExempt": true}"#).unwrap();

        assert_eq!(input.annual_rate, DEFAULT_ANNUAL_RATE);
        assert!(input.tax_exempt);
        assert_eq!(generate_trajectory(&input).len(), 8);
    }
}
