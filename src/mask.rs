//! Masking of sensitive field values for display and logging.
//!
//! Form values pass through this module before they reach `Debug` output or
//! tracing events. Only the last four characters of a card number are ever
//! shown; CVC values are fully masked.

use crate::format::{group, last_four, strip_whitespace};
use std::borrow::Cow;

/// How a field's value may be shown outside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sensitivity {
    /// Shown as is.
    #[default]
    Plain,
    /// Card number: last four characters kept.
    CardNumber,
    /// Fully masked.
    Secret,
}

/// Masks a card number, keeping the last four characters.
///
/// Whitespace is ignored and the result is grouped in blocks of four.
/// Values of four characters or fewer are fully masked.
///
/// # Example
///
/// ```
/// use payment_form::mask::mask_card_number;
///
/// assert_eq!(mask_card_number("1234 5678 1234 5678"), "**** **** **** 5678");
/// assert_eq!(mask_card_number("378282246310005"), "**** **** ***0 005");
/// assert_eq!(mask_card_number("123"), "***");
/// ```
pub fn mask_card_number(value: &str) -> String {
    let compact = strip_whitespace(value);
    let len = compact.chars().count();

    if len <= 4 {
        return "*".repeat(len);
    }

    let mut masked = "*".repeat(len - 4);
    masked.push_str(last_four(&compact));
    group(&masked)
}

/// Replaces every character with `*`.
///
/// # Example
///
/// ```
/// use payment_form::mask::mask_secret;
///
/// assert_eq!(mask_secret("1234"), "****");
/// ```
pub fn mask_secret(value: &str) -> String {
    "*".repeat(value.chars().count())
}

/// Applies the masking appropriate for `sensitivity`.
pub fn redact(value: &str, sensitivity: Sensitivity) -> Cow<'_, str> {
    match sensitivity {
        Sensitivity::Plain => Cow::Borrowed(value),
        Sensitivity::CardNumber => Cow::Owned(mask_card_number(value)),
        Sensitivity::Secret => Cow::Owned(mask_secret(value)),
    }
}
