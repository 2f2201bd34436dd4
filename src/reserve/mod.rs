//! Present value of a stream of fixed monthly installments
//!
//! Each installment is funded by its own slice of the lump sum, invested today and
//! withdrawn on its due date. The slice must grow enough that, after withholding tax
//! on the gain, it pays the installment exactly.
//!
//! - `input`: calculation inputs and rate-trend scenarios
//! - `discount`: the per-installment routine shared with the trajectory seed
//! - `engine`: headline present value, per-installment schedule and quote

mod input;
mod discount;
mod engine;

pub use input::{CalculationInput, RateTrend, DEFAULT_ANNUAL_RATE, FIRST_PAYMENT_MONTH, SAFETY_MARGIN_FACTOR};
pub use discount::{discount_installment, installment_values, InstallmentValue, MarginPolicy};
pub use engine::{compute_present_value, present_value_schedule, ReserveQuote};
