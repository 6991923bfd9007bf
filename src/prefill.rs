//! Saved card details used to pre-fill the form.
//!
//! A real implementation would fetch these from the backend with a session
//! or payment-intent token. [`StaticCardDetails`] returns a fixed test card.

use crate::error::PrefillError;
use crate::mask::mask_card_number;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Token the form loads its details with on initialization.
pub const DEFAULT_PREFILL_TOKEN: &str = "test1234";

/// Card details that can be loaded into the form. The CVC is never stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Card number without separators.
    pub card_number: String,
    /// Expiry, `MM/YY`.
    pub expiry: String,
    /// Billing postal code.
    pub postal_code: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("expiry", &self.expiry)
            .field("postal_code", &self.postal_code)
            .finish()
    }
}

/// Looks up saved card details by token.
#[async_trait]
pub trait CardDetailsSource: Send + Sync {
    /// Returns the details stored under `token`.
    async fn card_details(&self, token: &str) -> Result<CardDetails, PrefillError>;
}

/// Returns the same test card for every token.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCardDetails;

impl StaticCardDetails {
    /// The details returned for every token.
    pub fn details() -> CardDetails {
        CardDetails {
            card_number: "4000056655665556".to_string(),
            expiry: "12/27".to_string(),
            postal_code: "06614".to_string(),
        }
    }
}

#[async_trait]
impl CardDetailsSource for StaticCardDetails {
    async fn card_details(&self, _token: &str) -> Result<CardDetails, PrefillError> {
        Ok(Self::details())
    }
}

/// Details keyed by token, loaded up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCardDetails {
    entries: HashMap<String, CardDetails>,
}

impl InMemoryCardDetails {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores details under a token.
    pub fn with(mut self, token: impl Into<String>, details: CardDetails) -> Self {
        self.entries.insert(token.into(), details);
        self
    }

    /// Parses a JSON object mapping tokens to details.
    ///
    /// # Example
    ///
    /// ```
    /// use payment_form::prefill::InMemoryCardDetails;
    ///
    /// let store = InMemoryCardDetails::from_json(
    ///     r#"{"t1": {"cardNumber": "4000056655665556", "expiry": "12/27", "postalCode": "06614"}}"#,
    /// ).unwrap();
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, PrefillError> {
        let entries: HashMap<String, CardDetails> =
            serde_json::from_str(json).map_err(|e| PrefillError::Source {
                message: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Number of stored tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CardDetailsSource for InMemoryCardDetails {
    async fn card_details(&self, token: &str) -> Result<CardDetails, PrefillError> {
        self.entries
            .get(token)
            .cloned()
            .ok_or_else(|| PrefillError::NotFound {
                token: token.to_string(),
            })
    }
}
