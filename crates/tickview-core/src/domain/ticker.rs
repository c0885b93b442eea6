use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// User-supplied ticker, trimmed and stored uppercase.
///
/// Tickers are case-insensitive, so `tsla` and `TSLA` name the same series and
/// share a cache entry. No format validation is applied beyond non-emptiness;
/// an unknown ticker is reported by the provider as an empty history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_uppercases_ticker() {
        let parsed = Ticker::parse(" tsla ").expect("ticker should parse");
        assert_eq!(parsed.as_str(), "TSLA");
    }

    #[test]
    fn rejects_blank_ticker() {
        assert_eq!(Ticker::parse("   "), Err(ValidationError::EmptyTicker));
        assert_eq!(Ticker::parse(""), Err(ValidationError::EmptyTicker));
    }

    #[test]
    fn keeps_exchange_suffixes_and_symbols() {
        let parsed = Ticker::parse("brk-b").expect("ticker should parse");
        assert_eq!(parsed.as_str(), "BRK-B");
        let index = Ticker::parse("^gspc").expect("index tickers are accepted");
        assert_eq!(index.as_str(), "^GSPC");
    }
}
