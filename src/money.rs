use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Whole dollars.
pub type AmountValue = i64;

/// A bid amount exactly as the transport delivered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Whole(i64),
    Decimal(f64),
    Text(String),
    Other(serde_json::Value),
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Whole(value) => write!(f, "{}", value),
            RawAmount::Decimal(value) => write!(f, "{}", value),
            RawAmount::Text(text) => write!(f, "{}", text),
            RawAmount::Other(value) => write!(f, "{}", value),
        }
    }
}

impl Default for RawAmount {
    fn default() -> Self {
        RawAmount::Other(serde_json::Value::Null)
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        RawAmount::Whole(value)
    }
}

impl From<i32> for RawAmount {
    fn from(value: i32) -> Self {
        RawAmount::Whole(value.into())
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Decimal(value)
    }
}

impl From<&str> for RawAmount {
    fn from(text: &str) -> Self {
        RawAmount::Text(text.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Not a number: {0}")]
    NotNumeric(String),

    #[error("Not a finite number: {0}")]
    NotFinite(String),
}

/// A parsed bid amount, not yet checked for range or whole dollars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BidNumber {
    Whole(i64),
    Decimal(f64),
}

impl BidNumber {
    pub fn is_positive(&self) -> bool {
        match self {
            BidNumber::Whole(value) => *value > 0,
            BidNumber::Decimal(value) => *value > 0.0,
        }
    }

    pub fn exceeds(&self, limit: AmountValue) -> bool {
        match self {
            BidNumber::Whole(value) => *value > limit,
            BidNumber::Decimal(value) => *value > limit as f64,
        }
    }

    /// The whole-dollar value, if there is no cents component.
    /// 40.0 is whole, 39.999999 is not.
    pub fn whole_dollars(&self) -> Option<AmountValue> {
        match self {
            BidNumber::Whole(value) => Some(*value),
            BidNumber::Decimal(value) if value.fract() == 0.0 => Some(*value as AmountValue),
            BidNumber::Decimal(_) => None,
        }
    }
}

impl FromStr for BidNumber {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Ok(BidNumber::Whole(value));
        }

        // f64 parsing accepts "inf" and "NaN"; those are not bids
        let value = text
            .parse::<f64>()
            .map_err(|_| MoneyError::NotNumeric(s.to_string()))?;
        if value.is_finite() {
            Ok(BidNumber::Decimal(value))
        } else {
            Err(MoneyError::NotFinite(s.to_string()))
        }
    }
}

impl RawAmount {
    pub fn to_number(&self) -> Result<BidNumber, MoneyError> {
        match self {
            RawAmount::Whole(value) => Ok(BidNumber::Whole(*value)),
            RawAmount::Decimal(value) if value.is_finite() => Ok(BidNumber::Decimal(*value)),
            RawAmount::Decimal(value) => Err(MoneyError::NotFinite(value.to_string())),
            RawAmount::Text(text) => text.parse(),
            RawAmount::Other(value) => Err(MoneyError::NotNumeric(value.to_string())),
        }
    }
}
