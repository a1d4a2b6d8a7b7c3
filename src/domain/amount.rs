//! Amount type
//!
//! Domain primitive for monetary amounts. All amounts are validated at
//! construction time and normalized to the ledger's fixed-point scale, so an
//! invalid value cannot exist inside the system.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ledger amounts are fixed-point with two decimal places.
const SCALE: u32 = 2;

/// Amount represents a validated, positive monetary value.
///
/// Values are normalized to 2 decimal places with banker's rounding
/// (round half to even).
///
/// # Example
/// ```
/// use bank_ledger::domain::Amount;
///
/// let amount: Amount = "25.01".parse().unwrap();
/// assert_eq!(amount.to_string(), "25.01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount, rounding to 2 decimal places half-to-even.
    ///
    /// # Errors
    /// `AmountError::NotPositive` if the value rounds to zero or below.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        let rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointNearestEven);
        if rounded <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(rounded))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s).map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        format!("{:.2}", amount.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(100)).unwrap();
        assert_eq!(amount.value(), dec!(100.00));
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert!(matches!(
            Amount::new(Decimal::ZERO),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(
            Amount::new(dec!(-100)),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_amount_rounds_to_zero_rejected() {
        // Normalizes to 0.00, which is not a usable amount
        assert!(matches!(
            Amount::new(dec!(0.001)),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_amount_rounds_half_even() {
        assert_eq!(Amount::new(dec!(2.345)).unwrap().value(), dec!(2.34));
        assert_eq!(Amount::new(dec!(2.355)).unwrap().value(), dec!(2.36));
        assert_eq!(Amount::new(dec!(2.3449)).unwrap().value(), dec!(2.34));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = "123.456".parse().unwrap();
        assert_eq!(amount.value(), dec!(123.46));

        let err: Result<Amount, _> = "not-a-number".parse();
        assert!(matches!(err, Err(AmountError::ParseError(_))));
    }

    #[test]
    fn test_amount_display() {
        let amount = Amount::new(dec!(5)).unwrap();
        assert_eq!(amount.to_string(), "5.00");
    }
}
