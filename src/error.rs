//! Errors raised while turning raw user input into a calculation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InputError>;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("invalid amount: {value:?}")]
    InvalidAmount { value: String },

    #[error("invalid installment count: {value:?}")]
    InvalidInstallments { value: String },

    #[error("invalid rate: {value:?}")]
    InvalidRate { value: String },

    #[error("invalid CDI percentage: {value:?}")]
    InvalidPercentage { value: String },

    #[error("a reference rate is required for CDI-linked instruments")]
    MissingReferenceRate,
}

impl InputError {
    pub fn amount(value: impl Into<String>) -> Self {
        Self::InvalidAmount { value: value.into() }
    }

    pub fn installments(value: impl Into<String>) -> Self {
        Self::InvalidInstallments { value: value.into() }
    }

    pub fn rate(value: impl Into<String>) -> Self {
        Self::InvalidRate { value: value.into() }
    }

    pub fn percentage(value: impl Into<String>) -> Self {
        Self::InvalidPercentage { value: value.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::InputError;

    #[test]
    fn test_messages() {
        assert_eq!(InputError::amount("abc").to_string(), r#"invalid amount: "abc""#);
        assert_eq!(
            InputError::MissingReferenceRate.to_string(),
            "a reference rate is required for CDI-linked instruments"
        );
    }
}
