//! The payment form's fields and their validation rules.
//!
//! | Field | Rules |
//! |-------|-------|
//! | `cardNumber` | required, `(nnnn ){3}nnn[n]` or 15-16 digits |
//! | `expiry` | required, `MM/YY` (slash optional), not before the current month |
//! | `cvc` | required, at most 3 characters, 3-4 digits |
//! | `postalCode` | required, at least 5 characters, `nnnnn` or `nnnnn-nnnn` |
//!
//! The `cvc` rules disagree: the pattern admits four digits but the length
//! limit rejects them, so a four-digit CVC only fails `maxlength`. Both rules
//! are kept as configured pending a product decision on four-digit codes.

use crate::clock::Clock;
use crate::error::ConfigError;
use crate::expiry::{check_expiry, EXPIRY_PATTERN};
use crate::form::{FieldKey, FormConfig};
use crate::mask::Sensitivity;
use crate::rules::{Pattern, Rule};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Grouped (`1234 5678 1234 5678`, `1234 5678 1234 567`) or bare 15-16 digit card numbers.
pub const CARD_NUMBER_PATTERN: &str = "^(?:[0-9]{4} ){3}[0-9]{3,4}$|^[0-9]{15,16}$";

/// Three or four digits.
pub const CVC_PATTERN: &str = "^[0-9]{3,4}$";

/// Maximum CVC length enforced alongside [`CVC_PATTERN`].
pub const CVC_MAX_LENGTH: usize = 3;

/// Five digits, optionally followed by `-` and four digits.
pub const POSTAL_CODE_PATTERN: &str = "^[0-9]{5}(-[0-9]{4})?$";

/// Minimum postal code length.
pub const POSTAL_CODE_MIN_LENGTH: usize = 5;

/// A field of the payment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldName {
    /// Card number, displayed in groups of four.
    CardNumber,
    /// Expiry date, `MM/YY`.
    Expiry,
    /// Card verification code.
    Cvc,
    /// Billing postal code.
    PostalCode,
}

impl FieldKey for FieldName {
    const ALL: &'static [Self] = &[
        FieldName::CardNumber,
        FieldName::Expiry,
        FieldName::Cvc,
        FieldName::PostalCode,
    ];

    fn name(&self) -> &'static str {
        match self {
            FieldName::CardNumber => "cardNumber",
            FieldName::Expiry => "expiry",
            FieldName::Cvc => "cvc",
            FieldName::PostalCode => "postalCode",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| ConfigError::UnknownField(s.to_string()))
    }
}

/// Builds the payment form configuration.
///
/// The expiry rule reads `clock` every time it runs.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payment_form::clock::FixedClock;
/// use payment_form::fields::{payment_form_config, FieldName};
/// use payment_form::form::Form;
/// use payment_form::ErrorKind;
///
/// let clock = Arc::new(FixedClock::new(2025, 3).unwrap());
/// let mut form = Form::new(payment_form_config(clock).unwrap());
///
/// form.set_value(FieldName::Expiry, "02/25");
/// assert!(form.has_error(FieldName::Expiry, ErrorKind::Expired));
/// ```
pub fn payment_form_config(clock: Arc<dyn Clock>) -> Result<FormConfig<FieldName>, ConfigError> {
    let expiry_rule = Rule::custom("expiry", move |value| {
        check_expiry(value, clock.year_month())
    });

    Ok(FormConfig::new()
        .field(
            FieldName::CardNumber,
            vec![
                Rule::Required,
                Rule::Pattern(Pattern::anchored(CARD_NUMBER_PATTERN)?),
            ],
        )
        .field(
            FieldName::Expiry,
            vec![Rule::Required, Rule::pattern(EXPIRY_PATTERN)?, expiry_rule],
        )
        .field(
            FieldName::Cvc,
            vec![
                Rule::Required,
                Rule::MaxLength(CVC_MAX_LENGTH),
                Rule::pattern(CVC_PATTERN)?,
            ],
        )
        .field(
            FieldName::PostalCode,
            vec![
                Rule::Required,
                Rule::MinLength(POSTAL_CODE_MIN_LENGTH),
                Rule::pattern(POSTAL_CODE_PATTERN)?,
            ],
        )
        .sensitivity(FieldName::CardNumber, Sensitivity::CardNumber)
        .sensitivity(FieldName::Cvc, Sensitivity::Secret))
}
