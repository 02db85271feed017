//! # Commission Rates
//!
//! Fees and commissions are percentages with at most 4 decimal places
//! (`"2.5000"`, `"10"`, `"0.01"`). They are stored on the wire as the string
//! the caller supplied and parsed into a fixed-point `FeeRate` (scaled by
//! 1e4) at the point of use. Application is always floor-truncated via
//! [`crate::amount::Amount::percent_floor`].

use crate::error::{codes, LedgerError};

/// A percentage scaled by 10^4 (so `"2.5000"` is `25_000`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeeRate(u64);

impl FeeRate {
    pub fn zero() -> Self {
        FeeRate(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The rate scaled by 1e4, as consumed by `Amount::percent_floor`.
    pub fn scaled(&self) -> u64 {
        self.0
    }

    /// Parse `"<int>[.<frac>]"` with at most 4 fractional digits.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let bad = || {
            LedgerError::validation(codes::INVALID_NUMBER, format!("invalid fee rate: {s}"))
        };
        if s.is_empty() {
            return Err(bad());
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty()
            || int_part.len() > 3
            || frac_part.len() > 4
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(bad());
        }
        let int_val: u64 = int_part.parse().map_err(|_| bad())?;
        let mut frac_val: u64 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| bad())?
        };
        frac_val *= 10u64.pow(4 - frac_part.len() as u32);
        Ok(FeeRate(int_val * 10_000 + frac_val))
    }

    /// Parse and enforce `0 <= rate <= max_percent`.
    pub fn parse_bounded(s: &str, max_percent: u64) -> Result<Self, LedgerError> {
        let rate = Self::parse(s)?;
        if rate.0 > max_percent * 10_000 {
            return Err(LedgerError::validation(
                codes::INVALID_NUMBER,
                format!("fee rate out of range: {s} (max {max_percent})"),
            ));
        }
        Ok(rate)
    }
}
