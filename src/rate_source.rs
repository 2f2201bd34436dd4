//! Reference rate (Selic) lookup
//!
//! The lookup never fails from the caller's point of view: any error is recorded and the
//! fixed fallback rate is used instead.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public endpoint returning the current Selic rate
pub const SELIC_ENDPOINT: &str = "https://brasilapi.com.br/api/taxas/v1/selic";

/// Rate used when the lookup fails (percent a.a.)
pub const FALLBACK_REFERENCE_RATE: f64 = 11.25;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RateSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rate endpoint returned status {0}")]
    Status(u16),

    #[error("rate endpoint returned an invalid value: {0}")]
    InvalidValue(f64),
}

/// Anything that can provide the reference rate, in percent a.a.
pub trait RateSource {
    fn fetch(&self) -> Result<f64, RateSourceError>;
}

/// Payload of the rate endpoint: `{"nome": "Selic", "valor": 10.5}`
#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "valor")]
    value: f64,
}

impl RateResponse {
    fn into_rate(self) -> Result<f64, RateSourceError> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(RateSourceError::InvalidValue(self.value));
        }
        log::debug!("{} rate: {}", self.name, self.value);
        Ok(self.value)
    }
}

/// Decode and validate a rate endpoint payload
pub fn parse_rate_response(body: &str) -> Result<f64, RateSourceError> {
    serde_json::from_str::<RateResponse>(body)?.into_rate()
}

/// Blocking HTTP lookup against the public rate endpoint
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new() -> Result<Self, RateSourceError> {
        Self::with_endpoint(SELIC_ENDPOINT, DEFAULT_TIMEOUT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RateSourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl RateSource for HttpRateSource {
    fn fetch(&self) -> Result<f64, RateSourceError> {
        let response = self.client.get(&self.endpoint).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateSourceError::Status(status.as_u16()));
        }
        response.json::<RateResponse>()?.into_rate()
    }
}

/// Fixed rate, for offline runs and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticRateSource(pub f64);

impl RateSource for StaticRateSource {
    fn fetch(&self) -> Result<f64, RateSourceError> {
        Ok(self.0)
    }
}

/// Reference-rate state exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    /// Rate in percent a.a.; always set once resolved
    pub rate: Option<f64>,
    pub loading: bool,
    /// Why the fallback was used, if it was
    pub error: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl RateQuote {
    /// State before the lookup completes
    pub fn pending() -> Self {
        Self {
            rate: None,
            loading: true,
            error: None,
            resolved_at: None,
        }
    }

    /// Look the rate up, substituting the fallback on any failure
    pub fn resolve(source: &dyn RateSource) -> Self {
        let (rate, error) = match source.fetch() {
            Ok(rate) => {
                info!("reference rate: {:.2}%", rate);
                (rate, None)
            }
            Err(e) => {
                warn!("reference rate lookup failed ({}), using {:.2}%", e, FALLBACK_REFERENCE_RATE);
                (FALLBACK_REFERENCE_RATE, Some(e.to_string()))
            }
        };

        Self {
            rate: Some(rate),
            loading: false,
            error,
            resolved_at: Some(Utc::now()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl RateSource for FailingSource {
        fn fetch(&self) -> Result<f64, RateSourceError> {
            Err(RateSourceError::Status(503))
        }
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(parse_rate_response(r#"{"nome": "Selic", "valor": 10.5}"#).unwrap(), 10.5);
        assert!(matches!(
            parse_rate_response(r#"{"nome": "Selic", "valor": -1}"#),
            Err(RateSourceError::InvalidValue(_))
        ));
        assert!(matches!(parse_rate_response("<html>"), Err(RateSourceError::Json(_))));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let response = RateResponse { name: "Selic".to_string(), value: f64::NAN };
        assert!(matches!(response.into_rate(), Err(RateSourceError::InvalidValue(_))));

        let response = RateResponse { name: "Selic".to_string(), value: 0.0 };
        assert_eq!(response.into_rate().unwrap(), 0.0);
    }

    #[test]
    fn test_resolve_success() {
        let quote = RateQuote::resolve(&StaticRateSource(14.75));

        assert_eq!(quote.rate, Some(14.75));
        assert!(!quote.loading);
        assert!(!quote.is_fallback());
        assert!(quote.resolved_at.is_some());
    }

    #[test]
    fn test_resolve_falls_back() {
        let quote = RateQuote::resolve(&FailingSource);

        assert_eq!(quote.rate, Some(FALLBACK_REFERENCE_RATE));
        assert!(!quote.loading);
        assert!(quote.is_fallback());
        assert_eq!(quote.error.as_deref(), Some("rate endpoint returned status 503"));
    }

    #[test]
    fn test_pending() {
        let quote = RateQuote::pending();
        assert!(quote.loading);
        assert!(quote.rate.is_none());
        assert!(quote.error.is_none());
    }
}
