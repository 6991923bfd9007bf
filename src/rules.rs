//! Field validation rules.
//!
//! A [`Rule`] inspects a field's string value and either passes or yields a
//! [`FieldError`]. Apart from [`Rule::Required`], the built-in rules skip
//! empty values so an empty field reports only `required`.

use crate::error::{ConfigError, FieldError};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Signature of a custom rule.
pub type CustomCheck = dyn Fn(&str) -> Result<(), FieldError> + Send + Sync;

/// A compiled, anchored pattern.
///
/// Patterns not starting with `^` and ending with `$` are wrapped so the
/// whole value has to match.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern, anchoring it at both ends if needed.
    ///
    /// # Example
    ///
    /// ```
    /// use payment_form::rules::Pattern;
    ///
    /// let pattern = Pattern::new("[0-9]{5}").unwrap();
    /// assert_eq!(pattern.as_str(), "^[0-9]{5}$");
    /// assert!(pattern.is_match("12345"));
    /// assert!(!pattern.is_match("123456"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let mut source = String::with_capacity(pattern.len() + 2);
        if !pattern.starts_with('^') {
            source.push('^');
        }
        source.push_str(pattern);
        if !pattern.ends_with('$') {
            source.push('$');
        }
        Self::anchored(&source)
    }

    /// Compiles a pattern exactly as given.
    ///
    /// Use this for alternations that carry their own anchors, such as
    /// `^a$|^b$`.
    pub fn anchored(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Returns the pattern source after anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the value matches.
    #[inline]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

/// A single validation rule attached to a field.
#[derive(Clone)]
pub enum Rule {
    /// The value must not be empty.
    Required,
    /// The value must have at least this many characters.
    MinLength(usize),
    /// The value must have at most this many characters.
    MaxLength(usize),
    /// The value must match the pattern.
    Pattern(Pattern),
    /// A named rule backed by a closure. Runs on empty values too.
    Custom {
        /// Name used in diagnostics.
        name: &'static str,
        /// The check itself.
        check: Arc<CustomCheck>,
    },
}

impl Rule {
    /// Builds a pattern rule, anchoring the pattern.
    pub fn pattern(pattern: &str) -> Result<Self, ConfigError> {
        Pattern::new(pattern).map(Self::Pattern)
    }

    /// Builds a custom rule.
    pub fn custom<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), FieldError> + Send + Sync + 'static,
    {
        Self::Custom {
            name,
            check: Arc::new(check),
        }
    }

    /// Evaluates the rule against a value.
    ///
    /// # Example
    ///
    /// ```
    /// use payment_form::rules::Rule;
    /// use payment_form::FieldError;
    ///
    /// assert_eq!(Rule::Required.check(""), Err(FieldError::Required));
    /// assert!(Rule::MinLength(5).check("").is_ok());
    /// assert!(Rule::MaxLength(3).check("1234").is_err());
    /// ```
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        match self {
            Self::Required => {
                if value.is_empty() {
                    return Err(FieldError::Required);
                }
            }
            Self::MinLength(min) => {
                let length = value.chars().count();
                if length > 0 && length < *min {
                    return Err(FieldError::MinLength {
                        required_length: *min,
                        actual_length: length,
                    });
                }
            }
            Self::MaxLength(max) => {
                let length = value.chars().count();
                if length > *max {
                    return Err(FieldError::MaxLength {
                        required_length: *max,
                        actual_length: length,
                    });
                }
            }
            Self::Pattern(pattern) => {
                if !value.is_empty() && !pattern.is_match(value) {
                    return Err(FieldError::Pattern {
                        required_pattern: pattern.as_str().to_string(),
                        actual_value: value.to_string(),
                    });
                }
            }
            Self::Custom { check, .. } => check(value)?,
        }
        Ok(())
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::MinLength(n) => write!(f, "MinLength({})", n),
            Self::MaxLength(n) => write!(f, "MaxLength({})", n),
            Self::Pattern(p) => write!(f, "Pattern({})", p.as_str()),
            Self::Custom { name, .. } => write!(f, "Custom({})", name),
        }
    }
}
