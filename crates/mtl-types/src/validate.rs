//! Input validators shared by every handler: bounded strings, URLs, and
//! integer fields (token serial numbers, epoch timestamps).

use crate::error::{codes, LedgerError};

/// Enforce `min..=max` characters; `min = 0` permits the empty string.
pub fn check_string(name: &str, s: &str, min: usize, max: usize) -> Result<(), LedgerError> {
    let n = s.chars().count();
    if n < min || n > max {
        return Err(LedgerError::validation(
            codes::STRING_LENGTH,
            format!("{name} length must be {min}..{max} characters"),
        ));
    }
    Ok(())
}

/// URLs may be empty unless `min > 0`; non-empty URLs must carry an http(s)
/// scheme and respect the length bound.
pub fn check_url(name: &str, s: &str, min: usize, max: usize) -> Result<(), LedgerError> {
    check_string(name, s, min, max)?;
    if !s.is_empty() && !s.starts_with("http://") && !s.starts_with("https://") {
        return Err(LedgerError::validation(
            codes::BAD_URL,
            format!("{name} must be an http(s) url"),
        ));
    }
    Ok(())
}

/// Parse a non-negative i64 (token serial numbers, unlock dates).
pub fn parse_not_negative_i64(name: &str, s: &str) -> Result<i64, LedgerError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            format!("{name} must be a non-negative integer: {s}"),
        ));
    }
    s.parse::<i64>().map_err(|_| {
        LedgerError::validation(codes::INVALID_NUMBER, format!("{name} out of range: {s}"))
    })
}

/// Parse a strictly positive i64.
pub fn parse_positive_i64(name: &str, s: &str) -> Result<i64, LedgerError> {
    let v = parse_not_negative_i64(name, s)?;
    if v == 0 {
        return Err(LedgerError::validation(
            codes::INVALID_NUMBER,
            format!("{name} must be positive: {s}"),
        ));
    }
    Ok(v)
}

/// Fixed argument-count check for positional operation arguments.
pub fn check_arg_count(op: &str, args: &[String], expected: usize) -> Result<(), LedgerError> {
    if args.len() != expected {
        return Err(LedgerError::validation(
            codes::PARAMETER_COUNT,
            format!("{op} expects {expected} arguments, got {}", args.len()),
        ));
    }
    Ok(())
}
