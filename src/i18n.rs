//! Translation lookup for form labels and validation messages.
//!
//! The form only needs two things from a translation service: switching the
//! active language and looking up a key. [`MessageCatalog`] is an in-memory
//! implementation loaded from `i18n/<lang>.json` style documents.
//!
//! # Example
//!
//! ```
//! use payment_form::i18n::{MessageCatalog, Translator};
//!
//! let catalog = MessageCatalog::english();
//! catalog.load_json("es", r#"{"errors": {"cvc": {"required": "CVC obligatorio"}}}"#).unwrap();
//!
//! catalog.set_active_language("es");
//! assert_eq!(catalog.lookup("errors.cvc.required"), "CVC obligatorio");
//! // Missing keys fall back to the default language.
//! assert_eq!(catalog.lookup("errors.cvc.pattern"), "Enter a 3 or 4 digit security code");
//! ```

use crate::error::CatalogError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Language used when nothing else is selected.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Translation service used by the form.
pub trait Translator: Send + Sync {
    /// Switches the language used by [`Translator::lookup`].
    fn set_active_language(&self, code: &str);

    /// The currently active language code.
    fn active_language(&self) -> String;

    /// Returns the text for `key`, or the key itself if it has no translation.
    fn lookup(&self, key: &str) -> String;
}

type Messages = HashMap<String, String>;

/// In-memory catalog of messages per language.
#[derive(Debug)]
pub struct MessageCatalog {
    default_language: String,
    active: RwLock<String>,
    languages: RwLock<HashMap<String, Messages>>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new(default_language: impl Into<String>) -> Self {
        let default_language = default_language.into();
        let mut languages = HashMap::new();
        languages.insert(default_language.clone(), Messages::new());
        Self {
            active: RwLock::new(default_language.clone()),
            default_language,
            languages: RwLock::new(languages),
        }
    }

    /// A catalog holding the built-in English messages.
    pub fn english() -> Self {
        let catalog = Self::new(DEFAULT_LANGUAGE);
        catalog.insert_messages(
            DEFAULT_LANGUAGE,
            ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        catalog
    }

    /// Adds messages for a language, replacing existing keys.
    pub fn insert_messages(&self, language: &str, messages: Messages) {
        let mut languages = self.languages.write().unwrap_or_else(|e| e.into_inner());
        languages
            .entry(language.to_string())
            .or_default()
            .extend(messages);
    }

    /// Loads a JSON document of messages for a language.
    ///
    /// Nested objects are flattened with `.` separators, so
    /// `{"errors": {"cvc": {"required": "..."}}}` defines `errors.cvc.required`.
    /// Non-string leaves are ignored.
    pub fn load_json(&self, language: &str, json: &str) -> Result<(), CatalogError> {
        let document: Value = serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            language: language.to_string(),
            message: e.to_string(),
        })?;
        let Value::Object(_) = document else {
            return Err(CatalogError::NotAnObject {
                language: language.to_string(),
            });
        };

        let mut messages = Messages::new();
        flatten("", &document, &mut messages);
        debug!(language, keys = messages.len(), "loaded translation catalog");
        self.insert_messages(language, messages);
        Ok(())
    }

    /// Languages with at least an empty message table.
    pub fn available_languages(&self) -> Vec<String> {
        let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());
        let mut codes: Vec<String> = languages.keys().cloned().collect();
        codes.sort();
        codes
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator for MessageCatalog {
    fn set_active_language(&self, code: &str) {
        let known = self
            .languages
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(code);
        if !known {
            warn!(language = code, "no translations loaded for language, keeping current");
            return;
        }
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = code.to_string();
    }

    fn active_language(&self) -> String {
        self.active.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lookup(&self, key: &str) -> String {
        let active = self.active_language();
        let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());

        [active.as_str(), self.default_language.as_str()]
            .iter()
            .find_map(|lang| languages.get(*lang).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Messages) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten(&key, v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        _ => {}
    }
}

/// Built-in English messages.
const ENGLISH: &[(&str, &str)] = &[
    ("labels.cardNumber", "Card number"),
    ("labels.expiry", "Expiry (MM/YY)"),
    ("labels.cvc", "CVC"),
    ("labels.postalCode", "Postal code"),
    ("actions.pay", "Pay now"),
    ("actions.processing", "Processing..."),
    ("actions.reset", "Make another payment"),
    ("status.success", "Payment successful"),
    ("status.failed", "Payment failed, please try again"),
    ("errors.cardNumber.required", "Card number is required"),
    ("errors.cardNumber.pattern", "Enter a valid 15 or 16 digit card number"),
    ("errors.expiry.required", "Expiry date is required"),
    ("errors.expiry.pattern", "Use the MM/YY format"),
    ("errors.expiry.expired", "This card has expired"),
    ("errors.cvc.required", "CVC is required"),
    ("errors.cvc.maxlength", "CVC is too long"),
    ("errors.cvc.pattern", "Enter a 3 or 4 digit security code"),
    ("errors.postalCode.required", "Postal code is required"),
    ("errors.postalCode.minlength", "Postal code is too short"),
    ("errors.postalCode.pattern", "Use 12345 or 12345-6789"),
];
