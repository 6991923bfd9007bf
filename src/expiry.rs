//! Card expiry date rule.
//!
//! Expiry dates are entered as `MM/YY`. The separator is optional
//! (`MMYY` is accepted). Years are two-digit and compared against the
//! two-digit current year, so the rule does not roll over centuries.
//!
//! # Example
//!
//! ```
//! use payment_form::clock::YearMonth;
//! use payment_form::expiry::check_expiry;
//! use payment_form::FieldError;
//!
//! let now = YearMonth::new(25, 3).unwrap();
//! assert_eq!(check_expiry("02/25", now), Err(FieldError::Expired));
//! assert!(check_expiry("03/25", now).is_ok());
//! assert!(check_expiry("0425", now).is_ok());
//! ```

use crate::clock::YearMonth;
use crate::error::FieldError;
use std::fmt;

/// Pattern the expiry field must match.
pub const EXPIRY_PATTERN: &str = "^(0[1-9]|1[0-2])/?([0-9]{2})$";

/// Checks that an expiry value is well formed and not in the past.
///
/// The first `/` is removed. A result that is not exactly four characters
/// fails with a pattern error. Otherwise the first two characters are read as
/// the month and the last two as the year. The value is expired when its year
/// is before `now`'s year, or the same year with an earlier month. The
/// current month itself is still valid.
///
/// Month range is not checked here; that is left to [`EXPIRY_PATTERN`].
/// Halves that do not start with a number never count as expired.
pub fn check_expiry(value: &str, now: YearMonth) -> Result<(), FieldError> {
    let compact = value.replacen('/', "", 1);
    let chars: Vec<char> = compact.chars().collect();

    if chars.len() != 4 {
        return Err(FieldError::Pattern {
            required_pattern: EXPIRY_PATTERN.to_string(),
            actual_value: value.to_string(),
        });
    }

    let month_part: String = chars[..2].iter().collect();
    let year_part: String = chars[2..].iter().collect();

    let (Some(month), Some(year)) = (leading_int(&month_part), leading_int(&year_part)) else {
        return Ok(());
    };

    let current_year = i32::from(now.year());
    let current_month = i32::from(now.month());

    if year < current_year || (year == current_year && month < current_month) {
        return Err(FieldError::Expired);
    }
    Ok(())
}

/// Reads an optionally signed integer prefix, skipping leading whitespace.
fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value: i32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// A well-formed `MM/YY` expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryDate(YearMonth);

impl ExpiryDate {
    /// Parses `MM/YY` or `MMYY` with a month in 1-12.
    ///
    /// # Example
    ///
    /// ```
    /// use payment_form::expiry::ExpiryDate;
    ///
    /// let date = ExpiryDate::parse("12/27").unwrap();
    /// assert_eq!(date.month(), 12);
    /// assert_eq!(date.year(), 27);
    /// assert!(ExpiryDate::parse("13/25").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        let compact = value.replacen('/', "", 1);
        if compact.len() != 4 || !compact.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let month: u8 = compact[..2].parse().ok()?;
        let year: u8 = compact[2..].parse().ok()?;
        YearMonth::new(year, month).map(Self)
    }

    /// Month (1-12).
    #[inline]
    pub const fn month(&self) -> u8 {
        self.0.month()
    }

    /// Two-digit year.
    #[inline]
    pub const fn year(&self) -> u8 {
        self.0.year()
    }

    /// The date as a [`YearMonth`].
    pub const fn year_month(&self) -> YearMonth {
        self.0
    }

    /// Returns true if the expiry month is before `now`.
    pub fn is_expired_at(&self, now: YearMonth) -> bool {
        self.0 < now
    }

    /// Months from `now` until the end of the expiry month, 0 if expired.
    pub fn months_until(&self, now: YearMonth) -> u32 {
        let expiry = u32::from(self.year()) * 12 + u32::from(self.month());
        let current = u32::from(now.year()) * 12 + u32::from(now.month());
        expiry.saturating_sub(current)
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_25() -> YearMonth {
        YearMonth::new(25, 3).unwrap()
    }

    #[test]
    fn test_previous_month_is_expired() {
        assert_eq!(check_expiry("02/25", march_25()), Err(FieldError::Expired));
    }

    #[test]
    fn test_current_and_later_months_pass() {
        assert!(check_expiry("03/25", march_25()).is_ok());
        assert!(check_expiry("04/25", march_25()).is_ok());
        assert!(check_expiry("01/26", march_25()).is_ok());
    }

    #[test]
    fn test_previous_year_is_expired() {
        assert_eq!(check_expiry("12/24", march_25()), Err(FieldError::Expired));
    }

    #[test]
    fn test_separator_is_optional() {
        assert!(check_expiry("1225", march_25()).is_ok());
        assert_eq!(check_expiry("0225", march_25()), Err(FieldError::Expired));
    }

    #[test]
    fn test_wrong_length_is_pattern_error() {
        for value in ["", "1/25", "12/2025", "12//25", "122"] {
            let err = check_expiry(value, march_25()).unwrap_err();
            assert!(matches!(err, FieldError::Pattern { .. }), "value {:?}", value);
        }
    }

    #[test]
    fn test_month_range_not_checked_by_rule() {
        // 13/25 passes this rule; the field pattern rejects it.
        assert!(check_expiry("13/25", march_25()).is_ok());
    }

    #[test]
    fn test_non_numeric_halves_never_expire() {
        assert!(check_expiry("ab/cd", march_25()).is_ok());
        assert!(check_expiry("12/x1", march_25()).is_ok());
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("12"), Some(12));
        assert_eq!(leading_int("1a"), Some(1));
        assert_eq!(leading_int(" 7"), Some(7));
        assert_eq!(leading_int("-1"), Some(-1));
        assert_eq!(leading_int("a1"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_expiry_date_parse() {
        let date = ExpiryDate::parse("0427").unwrap();
        assert_eq!(date.to_string(), "04/27");
        assert!(ExpiryDate::parse("00/27").is_none());
        assert!(ExpiryDate::parse("4/27").is_none());
        assert!(ExpiryDate::parse("ab/cd").is_none());
    }

    #[test]
    fn test_expiry_date_relative_to_now() {
        let date = ExpiryDate::parse("12/25").unwrap();
        assert!(!date.is_expired_at(march_25()));
        assert_eq!(date.months_until(march_25()), 9);

        let date = ExpiryDate::parse("01/25").unwrap();
        assert!(date.is_expired_at(march_25()));
        assert_eq!(date.months_until(march_25()), 0);
    }
}
