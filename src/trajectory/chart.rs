//! Chart output structures for trajectories

use std::io;

use serde::{Deserialize, Serialize};

/// A single point of the balance chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub month: u32,
    /// Account balance, floored at zero for display
    pub balance: f64,
    /// Lump sum invested at month 0
    pub invested: f64,
    /// Cumulative installments paid
    pub withdrawn: f64,
}

/// Summary statistics for a trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectorySummary {
    pub total_months: u32,
    pub initial_investment: f64,
    pub total_withdrawn: f64,
    pub final_balance: f64,
    pub min_balance: f64,
    /// First month whose displayed balance is zero
    pub depleted_month: Option<u32>,
}

impl TrajectorySummary {
    pub fn from_points(points: &[ChartPoint]) -> Self {
        let initial_investment = points.first().map(|p| p.invested).unwrap_or(0.0);
        let total_withdrawn = points.last().map(|p| p.withdrawn).unwrap_or(0.0);
        let final_balance = points.last().map(|p| p.balance).unwrap_or(0.0);
        let min_balance = points
            .iter()
            .map(|p| p.balance)
            .fold(f64::INFINITY, f64::min);
        let depleted_month = points
            .iter()
            .find(|p| p.month > 0 && p.balance <= 0.0)
            .map(|p| p.month);

        Self {
            total_months: points.last().map(|p| p.month).unwrap_or(0),
            initial_investment,
            total_withdrawn,
            final_balance,
            min_balance: if points.is_empty() { 0.0 } else { min_balance },
            depleted_month,
        }
    }
}

/// Write chart points as CSV (header: month,balance,invested,withdrawn)
pub fn write_csv<W: io::Write>(points: &[ChartPoint], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(month: u32, balance: f64, withdrawn: f64) -> ChartPoint {
        ChartPoint { month, balance, invested: 1_000.0, withdrawn }
    }

    #[test]
    fn test_summary() {
        let points = vec![
            point(0, 1_000.0, 0.0),
            point(1, 1_008.0, 0.0),
            point(2, 510.0, 500.0),
            point(3, 0.0, 1_000.0),
        ];
        let summary = TrajectorySummary::from_points(&points);

        assert_eq!(summary.total_months, 3);
        assert_eq!(summary.initial_investment, 1_000.0);
        assert_eq!(summary.total_withdrawn, 1_000.0);
        assert_eq!(summary.final_balance, 0.0);
        assert_eq!(summary.min_balance, 0.0);
        assert_eq!(summary.depleted_month, Some(3));
    }

    #[test]
    fn test_empty_summary() {
        let summary = TrajectorySummary::from_points(&[]);
        assert_eq!(summary.total_months, 0);
        assert_eq!(summary.min_balance, 0.0);
        assert!(summary.depleted_month.is_none());
    }

    #[test]
    fn test_csv_output() {
        let points = vec![point(0, 1_000.0, 0.0), point(1, 1_008.5, 0.0)];
        let mut buffer = Vec::new();
        write_csv(&points, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("month,balance,invested,withdrawn"));
        assert_eq!(lines.next(), Some("0,1000.0,1000.0,0.0"));
        assert_eq!(lines.next(), Some("1,1008.5,1000.0,0.0"));
    }
}
