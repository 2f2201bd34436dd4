//! Running state of the investment during a trajectory simulation

use crate::tax::withholding_rate;

/// State of the investment at a point in time
#[derive(Debug, Clone)]
pub struct TrajectoryState {
    /// Current month (0 = day the lump sum is invested)
    pub month: u32,

    /// Account balance, may go slightly negative on the last withdrawal
    pub balance: f64,

    /// Amount invested at month 0
    pub invested: f64,

    /// Number of installments paid
    pub installments_paid: u32,

    /// Cumulative installments paid
    pub withdrawn: f64,

    /// Net-of-tax earnings credited so far
    pub net_earnings: f64,

    /// Withholding tax paid so far
    pub tax_paid: f64,
}

impl TrajectoryState {
    /// Initialize state with the lump sum invested
    pub fn new(invested: f64) -> Self {
        Self {
            month: 0,
            balance: invested,
            invested,
            installments_paid: 0,
            withdrawn: 0.0,
            net_earnings: 0.0,
            tax_paid: 0.0,
        }
    }

    /// Move to the next month and credit one month of earnings net of tax
    ///
    /// Tax is charged on this month's gain at the bracket for the total holding period.
    pub fn advance_month(&mut self, monthly_rate: f64, tax_exempt: bool) {
        self.month += 1;

        let gross = self.balance * monthly_rate;
        let tax = gross * withholding_rate(self.month, tax_exempt);

        self.balance += gross - tax;
        self.net_earnings += gross - tax;
        self.tax_paid += tax;
    }

    /// Pay one installment out of the balance
    pub fn withdraw(&mut self, amount: f64) {
        self.balance -= amount;
        self.installments_paid += 1;
        self.withdrawn = self.installments_paid as f64 * amount;
    }

    /// Balance as shown on the chart (never below zero)
    pub fn display_balance(&self) -> f64 {
        self.balance.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_month_uses_short_term_bracket() {
        let mut state = TrajectoryState::new(10_000.0);
        state.advance_month(0.01, false);

        // 100 gross, 22.5% withheld
        assert_eq!(state.month, 1);
        assert_relative_eq!(state.balance, 10_077.5, max_relative = 1e-12);
        assert_relative_eq!(state.tax_paid, 22.5, max_relative = 1e-12);
    }

    #[test]
    fn test_earnings_accumulate_net_of_tax() {
        let mut state = TrajectoryState::new(10_000.0);
        state.advance_month(0.01, false);
        state.advance_month(0.01, false);
        state.withdraw(1_000.0);

        // Balance = invested + net earnings - withdrawals
        assert_relative_eq!(state.net_earnings, 155.600625, max_relative = 1e-9);
        assert_relative_eq!(
            state.balance,
            state.invested + state.net_earnings - state.withdrawn,
            max_relative = 1e-12
        );
        assert_relative_eq!(state.tax_paid, 45.174375, max_relative = 1e-9);
    }

    #[test]
    fn test_exempt_month_keeps_full_gain() {
        let mut state = TrajectoryState::new(10_000.0);
        state.advance_month(0.01, true);

        assert_relative_eq!(state.balance, 10_100.0, max_relative = 1e-12);
        assert_eq!(state.tax_paid, 0.0);
    }

    #[test]
    fn test_withdrawal_and_display_floor() {
        let mut state = TrajectoryState::new(100.0);
        state.withdraw(60.0);
        state.withdraw(60.0);

        assert_relative_eq!(state.balance, -20.0);
        assert_eq!(state.display_balance(), 0.0);
        assert_eq!(state.installments_paid, 2);
        assert_eq!(state.withdrawn, 120.0);
    }
}
