//! # Exact Amount Arithmetic
//!
//! All monetary amounts on the wire are canonical base-10 integer strings:
//! no sign, no decimal point, no exponent, no leading zeros except `"0"`.
//! Internally an [`Amount`] is a `U256`; every operation is checked and an
//! overflow is a validation error rather than a wrap.
//!
//! Token decimal scaling (DEX price math, reserve math) goes through
//! [`Amount::mul_div_exact`] / [`Amount::mul_div_floor`]; the exact variant
//! rejects any division with a remainder, which is how
//! `1203,Price precision is too long` is produced.

use crate::error::{codes, LedgerError};
use primitive_types::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative exact integer amount.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(U256);

impl Amount {
    pub fn zero() -> Self {
        Amount(U256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn from_u64(v: u64) -> Self {
        Amount(U256::from(v))
    }

    /// Parse a canonical non-negative integer string. Rejects empty input,
    /// signs, decimal points, exponents, non-digits, and leading zeros.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        if s.is_empty() || s.len() > 78 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("invalid number format: {s}"),
            ));
        }
        if s.len() > 1 && s.starts_with('0') {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("invalid number format: {s}"),
            ));
        }
        U256::from_dec_str(s)
            .map(Amount)
            .map_err(|_| {
                LedgerError::validation(codes::AMOUNT_OVERFLOW, format!("amount overflow: {s}"))
            })
    }

    /// Parse and additionally require a strictly positive value.
    pub fn parse_positive(s: &str) -> Result<Self, LedgerError> {
        let amount = Self::parse(s)?;
        if amount.is_zero() {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("amount must be positive: {s}"),
            ));
        }
        Ok(amount)
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, LedgerError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::validation(codes::AMOUNT_OVERFLOW, "amount overflow"))
    }

    /// `self - other`, or `None` on underflow. Callers decide whether the
    /// underflow is `5000,Not enough balance` or a supply underflow.
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn checked_mul(&self, other: &Amount) -> Result<Amount, LedgerError> {
        self.0
            .checked_mul(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::validation(codes::AMOUNT_OVERFLOW, "amount overflow"))
    }

    /// `self * mul / 10^decimal`, floor-truncated.
    pub fn mul_div_floor(&self, mul: &Amount, decimal: u32) -> Result<Amount, LedgerError> {
        let product = self.checked_mul(mul)?;
        Ok(Amount(product.0 / pow10(decimal)))
    }

    /// `self * mul / 10^decimal`, rejecting any non-zero remainder with
    /// `1203,Price precision is too long`.
    pub fn mul_div_exact(&self, mul: &Amount, decimal: u32) -> Result<Amount, LedgerError> {
        let product = self.checked_mul(mul)?;
        let divisor = pow10(decimal);
        if product.0 % divisor != U256::zero() {
            return Err(LedgerError::price_precision());
        }
        Ok(Amount(product.0 / divisor))
    }

    /// Commission application: `floor(self * rate / 100)` where `rate` is a
    /// percentage scaled by 1e4 (see [`crate::fee::FeeRate`]).
    pub fn percent_floor(&self, rate_scaled_1e4: u64) -> Result<Amount, LedgerError> {
        let product = self.checked_mul(&Amount(U256::from(rate_scaled_1e4)))?;
        Ok(Amount(product.0 / U256::from(1_000_000u64)))
    }

    /// Whether `self` is an exact multiple of `step` (auction bid increments).
    /// A zero step never matches.
    pub fn is_multiple_of(&self, step: &Amount) -> bool {
        !step.0.is_zero() && (self.0 % step.0).is_zero()
    }
}

/// `10^exp` as `U256`. Token decimals are bounded to 18, so this never
/// approaches overflow.
pub fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_forms() {
        assert!(Amount::parse("0").is_ok());
        assert!(Amount::parse("1").is_ok());
        assert!(Amount::parse("1000000000000000000000000000").is_ok());
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        for bad in ["", "-1", "+1", "1.5", "1e3", "01", "00", " 1", "abc"] {
            assert!(Amount::parse(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_parse_positive_rejects_zero() {
        assert!(Amount::parse_positive("0").is_err());
        assert!(Amount::parse_positive("1").is_ok());
    }

    #[test]
    fn test_add_sub_roundtrip() {
        let a = Amount::parse("100").unwrap();
        let b = Amount::parse("42").unwrap();
        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.to_string(), "142");
        assert_eq!(sum.checked_sub(&b).unwrap(), a);
    }

    #[test]
    fn test_sub_underflow_is_none() {
        let a = Amount::parse("1").unwrap();
        let b = Amount::parse("2").unwrap();
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn test_mul_div_exact_rejects_remainder() {
        let price = Amount::parse("3").unwrap();
        let qtt = Amount::parse("5").unwrap();
        // 15 / 10^1 = 1.5 — not an integer
        let err = price.mul_div_exact(&qtt, 1).unwrap_err();
        assert_eq!(err.to_string(), "1203,Price precision is too long");
        // 15 / 10^0 = 15
        assert_eq!(price.mul_div_exact(&qtt, 0).unwrap().to_string(), "15");
    }

    #[test]
    fn test_mul_div_floor_truncates() {
        let price = Amount::parse("3").unwrap();
        let qtt = Amount::parse("5").unwrap();
        assert_eq!(price.mul_div_floor(&qtt, 1).unwrap().to_string(), "1");
    }

    #[test]
    fn test_percent_floor() {
        // 500 * 10.0000% = 50
        let amount = Amount::parse("500").unwrap();
        assert_eq!(amount.percent_floor(100_000).unwrap().to_string(), "50");
        // 1000 * 2.5000% = 25
        let amount = Amount::parse("1000").unwrap();
        assert_eq!(amount.percent_floor(25_000).unwrap().to_string(), "25");
        // 999 * 2.5000% = 24.975 -> 24
        let amount = Amount::parse("999").unwrap();
        assert_eq!(amount.percent_floor(25_000).unwrap().to_string(), "24");
    }

    #[test]
    fn test_is_multiple_of() {
        let a = Amount::parse("15").unwrap();
        assert!(a.is_multiple_of(&Amount::parse("5").unwrap()));
        assert!(!a.is_multiple_of(&Amount::parse("4").unwrap()));
        assert!(!a.is_multiple_of(&Amount::zero()));
    }

    #[test]
    fn test_serde_is_string() {
        let amount = Amount::parse("12345").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"12345\"");
        let back: Amount = serde_json::from_str("\"12345\"").unwrap();
        assert_eq!(back, amount);
    }
}
