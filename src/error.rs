//! Error types for the payment form.
//!
//! Field validation produces [`FieldError`] values that are stored on each
//! field and only surfaced once the user has interacted with it. Submission
//! failures are reported through [`SubmitError`].

use std::fmt;

/// The kind of a field validation error.
///
/// The string form (see [`ErrorKind::as_str`]) is the key passed to
/// `has_error` and used to build translation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// The field is empty.
    Required,
    /// The value does not match the field's pattern.
    Pattern,
    /// The value is shorter than the minimum length.
    MinLength,
    /// The value is longer than the maximum length.
    MaxLength,
    /// The expiry date lies before the current month.
    Expired,
}

impl ErrorKind {
    /// All error kinds, in the order rules usually report them.
    pub const ALL: [ErrorKind; 5] = [
        ErrorKind::Required,
        ErrorKind::Pattern,
        ErrorKind::MinLength,
        ErrorKind::MaxLength,
        ErrorKind::Expired,
    ];

    /// Returns the error key (`required`, `pattern`, `minlength`, `maxlength`, `expired`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Pattern => "pattern",
            Self::MinLength => "minlength",
            Self::MaxLength => "maxlength",
            Self::Expired => "expired",
        }
    }

    /// Parses an error key.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == key)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure on a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The field has no value.
    Required,

    /// The value does not match the required pattern.
    Pattern {
        /// The anchored pattern the value was tested against.
        required_pattern: String,
        /// The rejected value.
        actual_value: String,
    },

    /// The value is too short.
    MinLength {
        /// Minimum number of characters.
        required_length: usize,
        /// Number of characters supplied.
        actual_length: usize,
    },

    /// The value is too long.
    MaxLength {
        /// Maximum number of characters.
        required_length: usize,
        /// Number of characters supplied.
        actual_length: usize,
    },

    /// The expiry month has already passed.
    Expired,
}

impl FieldError {
    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Required => ErrorKind::Required,
            Self::Pattern { .. } => ErrorKind::Pattern,
            Self::MinLength { .. } => ErrorKind::MinLength,
            Self::MaxLength { .. } => ErrorKind::MaxLength,
            Self::Expired => ErrorKind::Expired,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "value is required"),
            Self::Pattern {
                required_pattern, ..
            } => {
                write!(f, "value does not match pattern {}", required_pattern)
            }
            Self::MinLength {
                required_length,
                actual_length,
            } => {
                write!(
                    f,
                    "value too short: got {} characters, minimum is {}",
                    actual_length, required_length
                )
            }
            Self::MaxLength {
                required_length,
                actual_length,
            } => {
                write!(
                    f,
                    "value too long: got {} characters, maximum is {}",
                    actual_length, required_length
                )
            }
            Self::Expired => write!(f, "card has expired"),
        }
    }
}

impl std::error::Error for FieldError {}

/// Errors reported by a payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The gateway rejected the payment.
    Declined {
        /// Gateway-provided reason. Carries no card data.
        reason: String,
    },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined { reason } => write!(f, "payment declined: {}", reason),
        }
    }
}

impl std::error::Error for PaymentError {}

/// Reasons a submission attempt did not produce a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// At least one field failed validation. Nothing was sent.
    InvalidForm {
        /// Names of the invalid fields, in form order.
        invalid_fields: Vec<&'static str>,
    },

    /// A submission is already in flight.
    AlreadyProcessing,

    /// The gateway rejected the payment.
    Payment(PaymentError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidForm { invalid_fields } => {
                write!(f, "form is invalid: {}", invalid_fields.join(", "))
            }
            Self::AlreadyProcessing => write!(f, "a payment is already being processed"),
            Self::Payment(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Payment(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PaymentError> for SubmitError {
    fn from(e: PaymentError) -> Self {
        Self::Payment(e)
    }
}

/// Errors raised while loading saved card details into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefillError {
    /// No card details are stored under the token.
    NotFound {
        /// The token that was looked up.
        token: String,
    },

    /// The details source failed.
    Source {
        /// Description of the failure.
        message: String,
    },
}

impl fmt::Display for PrefillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { token } => write!(f, "no card details found for token '{}'", token),
            Self::Source { message } => write!(f, "card details source failed: {}", message),
        }
    }
}

impl std::error::Error for PrefillError {}

/// Errors raised while building a form configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field pattern could not be compiled.
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Message from the regex engine.
        message: String,
    },

    /// A field name was not recognised.
    UnknownField(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern '{}': {}", pattern, message)
            }
            Self::UnknownField(name) => write!(f, "unknown field '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised while loading a translation catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog document could not be parsed.
    Parse {
        /// Language the catalog was loaded for.
        language: String,
        /// Message from the parser.
        message: String,
    },

    /// The catalog document is not a JSON object.
    NotAnObject {
        /// Language the catalog was loaded for.
        language: String,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { language, message } => {
                write!(f, "failed to parse '{}' catalog: {}", language, message)
            }
            Self::NotAnObject { language } => {
                write!(f, "'{}' catalog must be a JSON object", language)
            }
        }
    }
}

impl std::error::Error for CatalogError {}
