//! Installment Reserve - how much to set aside today to pay a series of installments
//!
//! This library provides:
//! - Regressive withholding-tax lookup for fixed-income withdrawals
//! - Present value of fixed monthly installments under compounding, tax, rate drift
//!   and an optional safety margin
//! - Month-by-month balance trajectory of the funding investment, for charting
//! - Investment-class normalization (plain rate, CDB, LCI/LCA) and form parsing
//! - Reference-rate lookup with a fixed fallback
//! - Multi-scenario comparison grid

pub mod error;
pub mod tax;
pub mod reserve;
pub mod trajectory;
pub mod instrument;
pub mod rate_source;
pub mod scenario;

// Re-export commonly used types
pub use error::InputError;
pub use tax::{resolve_tax_rate, withholding_rate, TaxBracket, REGRESSIVE_BRACKETS};
pub use reserve::{compute_present_value, present_value_schedule, CalculationInput, RateTrend, ReserveQuote};
pub use trajectory::{generate_trajectory, ChartPoint, TrajectoryInput, TrajectorySummary};
pub use instrument::{CalculatorForm, InvestmentClass};
pub use rate_source::{RateQuote, RateSource};
pub use scenario::ScenarioRunner;
