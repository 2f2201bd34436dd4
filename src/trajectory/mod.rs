//! Month-by-month balance of the funding investment, for charting

mod state;
mod simulator;
mod chart;

pub use state::TrajectoryState;
pub use simulator::{generate_trajectory, TrajectoryInput};
pub use chart::{write_csv, ChartPoint, TrajectorySummary};
