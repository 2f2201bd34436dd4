//! Investment classes and raw form input
//!
//! Everything here runs before the core: it turns what the user typed into a single
//! normalized `annual_rate` + `tax_exempt` pair. Supported classes:
//! - Plain rate (e.g. Treasury Selic): the annual rate as typed, taxed
//! - CDB: a percentage of CDI, taxed
//! - LCI/LCA: a percentage of CDI, exempt from withholding tax
//!
//! CDI tracks the reference rate about 0.1 pp below it.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::reserve::{CalculationInput, RateTrend};

pub const MIN_INSTALLMENTS: u32 = 1;
pub const MAX_INSTALLMENTS: u32 = 99;

/// Distance between the reference rate and CDI, in percentage points
pub const CDI_SPREAD_PP: f64 = 0.1;

/// Kind of instrument selected in the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum InstrumentKind {
    #[default]
    #[value(name = "plain")]
    PlainRate,
    #[value(name = "cdb")]
    BankCertificate,
    #[value(name = "lci")]
    TaxExemptCertificate,
}

impl InstrumentKind {
    /// Attach the rate typed by the user (annual % or % of CDI)
    pub fn with_rate(self, rate_pct: f64) -> InvestmentClass {
        match self {
            InstrumentKind::PlainRate => InvestmentClass::PlainRate { annual_rate_pct: rate_pct },
            InstrumentKind::BankCertificate => InvestmentClass::BankCertificate { cdi_pct: rate_pct },
            InstrumentKind::TaxExemptCertificate => InvestmentClass::TaxExemptCertificate { cdi_pct: rate_pct },
        }
    }
}

/// Investment used to fund the installments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InvestmentClass {
    /// Nominal annual rate in percent (11.75 for 11.75%)
    #[serde(rename_all = "camelCase")]
    PlainRate { annual_rate_pct: f64 },
    /// CDB paying a percentage of CDI
    #[serde(rename_all = "camelCase")]
    BankCertificate { cdi_pct: f64 },
    /// LCI/LCA paying a percentage of CDI, no withholding tax
    #[serde(rename_all = "camelCase")]
    TaxExemptCertificate { cdi_pct: f64 },
}

impl InvestmentClass {
    pub fn is_tax_exempt(&self) -> bool {
        matches!(self, InvestmentClass::TaxExemptCertificate { .. })
    }

    /// Annual rate as a fraction
    ///
    /// CDI-linked classes need the reference rate (percent a.a.).
    pub fn annual_rate(&self, reference_rate_pct: Option<f64>) -> Result<f64> {
        match *self {
            InvestmentClass::PlainRate { annual_rate_pct } => Ok(annual_rate_pct / 100.0),
            InvestmentClass::BankCertificate { cdi_pct }
            | InvestmentClass::TaxExemptCertificate { cdi_pct } => {
                let reference = reference_rate_pct.ok_or(InputError::MissingReferenceRate)?;
                Ok(cdi_annual_rate(reference, cdi_pct))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvestmentClass::PlainRate { .. } => "plain rate",
            InvestmentClass::BankCertificate { .. } => "CDB",
            InvestmentClass::TaxExemptCertificate { .. } => "LCI/LCA",
        }
    }
}

/// Annual rate (fraction) of an instrument paying `cdi_pct`% of CDI
pub fn cdi_annual_rate(reference_rate_pct: f64, cdi_pct: f64) -> f64 {
    (reference_rate_pct - CDI_SPREAD_PP) * cdi_pct / 100.0 / 100.0
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a money amount, accepting comma or dot as decimal separator
pub fn parse_amount(raw: &str) -> Result<f64> {
    parse_decimal(raw).ok_or_else(|| InputError::amount(raw))
}

/// Parse an installment count, clamped to [1, 99]
///
/// Only the leading integer is read, so "6.5" and "6x" both mean 6. Input with no
/// leading digits is rejected.
pub fn parse_installments(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return Err(InputError::installments(raw));
    }

    // Anything too long for u64 is far above the cap anyway
    let count = digits.parse::<u64>().unwrap_or(u64::MAX);
    if negative {
        return Ok(MIN_INSTALLMENTS);
    }
    Ok(count.clamp(MIN_INSTALLMENTS as u64, MAX_INSTALLMENTS as u64) as u32)
}

/// Raw calculator form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorForm {
    pub total: String,
    pub installments: String,
    /// Annual % for plain-rate instruments, % of CDI otherwise
    pub rate: String,
    pub kind: InstrumentKind,
    pub rate_trend: RateTrend,
    pub safety_margin: bool,
}

impl CalculatorForm {
    /// Resolve the investment class, pre-filling an empty plain rate with the reference rate
    pub fn investment(&self, reference_rate_pct: Option<f64>) -> Result<InvestmentClass> {
        let rate_pct = match (self.rate.trim().is_empty(), self.kind, reference_rate_pct) {
            (true, InstrumentKind::PlainRate, Some(reference)) => reference,
            (_, InstrumentKind::PlainRate, _) => {
                parse_decimal(&self.rate).ok_or_else(|| InputError::rate(self.rate.as_str()))?
            }
            _ => parse_decimal(&self.rate).ok_or_else(|| InputError::percentage(self.rate.as_str()))?,
        };
        Ok(self.kind.with_rate(rate_pct))
    }

    /// Build the normalized calculation input
    pub fn to_input(&self, reference_rate_pct: Option<f64>) -> Result<CalculationInput> {
        let investment = self.investment(reference_rate_pct)?;

        Ok(CalculationInput {
            total: parse_amount(&self.total)?,
            installment_count: parse_installments(&self.installments)?,
            annual_rate: investment.annual_rate(reference_rate_pct)?,
            rate_trend: self.rate_trend,
            safety_margin: self.safety_margin,
            tax_exempt: investment.is_tax_exempt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_amount_separators() {
        assert_eq!(parse_amount("1234,56").unwrap(), 1234.56);
        assert_eq!(parse_amount(" 1234.56 ").unwrap(), 1234.56);
        assert_eq!(parse_amount("10000").unwrap(), 10_000.0);
        assert_eq!(parse_amount(""), Err(InputError::amount("")));
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn test_installments_clamped() {
        assert_eq!(parse_installments("6").unwrap(), 6);
        assert_eq!(parse_installments("0").unwrap(), 1);
        assert_eq!(parse_installments("-4").unwrap(), 1);
        assert_eq!(parse_installments("150").unwrap(), 99);
        assert_eq!(parse_installments("99999999999999999999999").unwrap(), 99);
        assert!(parse_installments("").is_err());
        assert!(parse_installments("abc").is_err());
        assert!(parse_installments("-").is_err());
    }

    #[test]
    fn test_installments_read_leading_integer() {
        assert_eq!(parse_installments("6.5").unwrap(), 6);
        assert_eq!(parse_installments(" 12x").unwrap(), 12);
        assert_eq!(parse_installments("+7").unwrap(), 7);
        assert_eq!(parse_installments("0.9").unwrap(), 1);
    }

    #[test]
    fn test_cdi_rate() {
        // Selic 11.75% -> CDI 11.65%; 100% of CDI
        assert_relative_eq!(cdi_annual_rate(11.75, 100.0), 0.1165, max_relative = 1e-12);
        // 90% of CDI
        assert_relative_eq!(cdi_annual_rate(11.75, 90.0), 0.10485, max_relative = 1e-12);
    }

    #[test]
    fn test_investment_classes() {
        let plain = InvestmentClass::PlainRate { annual_rate_pct: 11.75 };
        assert_relative_eq!(plain.annual_rate(None).unwrap(), 0.1175, max_relative = 1e-12);
        assert!(!plain.is_tax_exempt());

        let cdb = InvestmentClass::BankCertificate { cdi_pct: 110.0 };
        assert!(!cdb.is_tax_exempt());
        assert_eq!(cdb.annual_rate(None), Err(InputError::MissingReferenceRate));

        let lci = InvestmentClass::TaxExemptCertificate { cdi_pct: 90.0 };
        assert!(lci.is_tax_exempt());
        assert_relative_eq!(lci.annual_rate(Some(15.0)).unwrap(), 0.1341, max_relative = 1e-12);
    }

    #[test]
    fn test_form_to_input() {
        let form = CalculatorForm {
            total: "12000".to_string(),
            installments: "12".to_string(),
            rate: "90".to_string(),
            kind: InstrumentKind::TaxExemptCertificate,
            rate_trend: RateTrend::Falling,
            safety_margin: true,
        };
        let input = form.to_input(Some(11.25)).unwrap();

        assert_eq!(input.total, 12_000.0);
        assert_eq!(input.installment_count, 12);
        assert!(input.tax_exempt);
        assert!(input.safety_margin);
        assert_eq!(input.rate_trend, RateTrend::Falling);
        assert_relative_eq!(input.annual_rate, 0.10035, max_relative = 1e-12);
    }

    #[test]
    fn test_empty_plain_rate_uses_reference() {
        let form = CalculatorForm {
            total: "5000".to_string(),
            installments: "5".to_string(),
            ..Default::default()
        };

        let input = form.to_input(Some(10.5)).unwrap();
        assert_relative_eq!(input.annual_rate, 0.105, max_relative = 1e-12);
        assert!(!input.tax_exempt);

        assert_eq!(form.to_input(None), Err(InputError::rate("")));
    }

    #[test]
    fn test_form_from_json() {
        let form: CalculatorForm = serde_json::from_str(
            r#"{"total": "1500,50", "installments": "3", "rate": "100", "kind": "bankCertificate"}"#,
        )
        .unwrap();

        let input = form.to_input(Some(10.1)).unwrap();
        assert_eq!(input.total, 1500.5);
        assert_relative_eq!(input.annual_rate, 0.10, max_relative = 1e-12);
        assert!(!input.tax_exempt);
    }

    #[test]
    fn test_investment_class_json() {
        let class: InvestmentClass =
            serde_json::from_str(r#"{"kind": "taxExemptCertificate", "cdiPct": 95}"#).unwrap();
        assert_eq!(class, InvestmentClass::TaxExemptCertificate { cdi_pct: 95.0 });
    }
}
