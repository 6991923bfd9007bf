//! The payment form controller.
//!
//! [`PaymentFormController`] owns the payment form, formats card number
//! input and drives the submission lifecycle:
//!
//! ```text
//! idle --submit (form valid, not processing)--> processing
//! processing --gateway settles--> success | failed
//! success | failed --reset--> idle
//! ```
//!
//! The processing flag and payment status are published through a
//! [`tokio::sync::watch`] channel, see [`PaymentFormController::subscribe`].
//! The flag is always lowered before a `success` or `failed` status becomes
//! visible.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use payment_form::clock::FixedClock;
//! use payment_form::controller::{PaymentFormController, PaymentStatus};
//! use payment_form::fields::FieldName;
//! use payment_form::gateway::{FixedOutcome, SimulatedGateway};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let mut controller = PaymentFormController::builder()
//!     .clock(Arc::new(FixedClock::new(2025, 3).unwrap()))
//!     .gateway(Arc::new(SimulatedGateway::new(Duration::from_millis(1), FixedOutcome::Succeed)))
//!     .build()
//!     .unwrap();
//!
//! controller.on_card_input("1234567812345678");
//! controller.input(FieldName::Expiry, "12/25");
//! controller.input(FieldName::Cvc, "123");
//! controller.input(FieldName::PostalCode, "12345");
//!
//! controller.submit().await.unwrap();
//! assert_eq!(controller.payment_status(), Some(PaymentStatus::Success));
//! assert!(!controller.is_processing());
//! # });
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::{ConfigError, ErrorKind, PrefillError, SubmitError};
use crate::fields::{payment_form_config, FieldName};
use crate::form::{FieldKey, Form, UpdateOptions};
use crate::format::{format_card_input, group};
use crate::gateway::{GatewayConfig, PaymentGateway, PaymentReceipt, SimulatedGateway};
use crate::i18n::{MessageCatalog, Translator};
use crate::mask::mask_card_number;
use crate::prefill::{CardDetailsSource, StaticCardDetails, DEFAULT_PREFILL_TOKEN};
use crate::token::placeholder_token;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Outcome of the last submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Cleared by a reset.
    #[serde(rename = "")]
    Cleared,
    /// The payment went through.
    Success,
    /// The gateway rejected the payment.
    Failed,
}

impl PaymentStatus {
    /// Status string: `""`, `"success"` or `"failed"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cleared => "",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the submission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Nothing submitted yet, or reset since.
    Idle,
    /// Waiting for the gateway.
    Processing,
    /// The last payment succeeded.
    Succeeded,
    /// The last payment failed.
    Failed,
}

/// Observable submission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormStatus {
    /// True only while a payment is in flight.
    pub processing: bool,
    /// `None` until the first submission settles or the form is reset.
    pub payment_status: Option<PaymentStatus>,
}

impl FormStatus {
    /// The state machine phase this status corresponds to.
    pub fn phase(&self) -> SubmissionPhase {
        if self.processing {
            return SubmissionPhase::Processing;
        }
        match self.payment_status {
            Some(PaymentStatus::Success) => SubmissionPhase::Succeeded,
            Some(PaymentStatus::Failed) => SubmissionPhase::Failed,
            Some(PaymentStatus::Cleared) | None => SubmissionPhase::Idle,
        }
    }
}

/// Holds the processing flag raised for as long as it lives.
struct ProcessingGuard<'a> {
    status: &'a watch::Sender<FormStatus>,
}

impl<'a> ProcessingGuard<'a> {
    /// Raises the flag, or returns `None` if it is already raised.
    fn acquire(status: &'a watch::Sender<FormStatus>) -> Option<Self> {
        let raised = status.send_if_modified(|s| {
            if s.processing {
                return false;
            }
            s.processing = true;
            true
        });
        raised.then_some(Self { status })
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.status.send_if_modified(|s| std::mem::replace(&mut s.processing, false));
    }
}

/// Controller for the card payment form.
pub struct PaymentFormController {
    form: Form<FieldName>,
    status: watch::Sender<FormStatus>,
    translator: Arc<dyn Translator>,
    gateway: Arc<dyn PaymentGateway>,
    details: Arc<dyn CardDetailsSource>,
    clock: Arc<dyn Clock>,
}

impl PaymentFormController {
    /// Creates a controller with default collaborators.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// Starts building a controller.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    /// The underlying form.
    pub fn form(&self) -> &Form<FieldName> {
        &self.form
    }

    /// Current submission state.
    pub fn status(&self) -> FormStatus {
        *self.status.borrow()
    }

    /// Watches the submission state.
    pub fn subscribe(&self) -> watch::Receiver<FormStatus> {
        self.status.subscribe()
    }

    /// True while a payment is in flight.
    pub fn is_processing(&self) -> bool {
        self.status().processing
    }

    /// Outcome of the last submission.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.status().payment_status
    }

    /// Forwards a language code from the host page. Empty codes are ignored.
    pub fn set_language(&self, code: &str) {
        if code.is_empty() {
            return;
        }
        self.translator.set_active_language(code);
    }

    /// Looks up a translated message.
    pub fn translate(&self, key: &str) -> String {
        self.translator.lookup(key)
    }

    /// Translated message for a field error (`errors.<field>.<kind>`).
    pub fn error_message(&self, field: FieldName, kind: ErrorKind) -> String {
        self.translate(&format!("errors.{}.{}", field.name(), kind.as_str()))
    }

    /// Translated messages for the errors a user should currently see.
    ///
    /// Empty for fields the user has not touched or edited yet.
    pub fn visible_errors(&self, field: FieldName) -> Vec<String> {
        if !self.form.is_field_invalid(field) {
            return Vec::new();
        }
        self.form
            .errors(field)
            .iter()
            .map(|e| self.error_message(field, e.kind()))
            .collect()
    }

    /// True if the field is invalid and the user has touched or edited it.
    pub fn is_field_invalid(&self, field: FieldName) -> bool {
        self.form.is_field_invalid(field)
    }

    /// True if the field currently has an error of this kind.
    pub fn has_error(&self, field: FieldName, kind: ErrorKind) -> bool {
        self.form.has_error(field, kind)
    }

    /// Handles a keystroke in the card number field.
    ///
    /// The raw input is regrouped into blocks of four and written back
    /// without publishing a change notification.
    pub fn on_card_input(&mut self, raw: &str) {
        let formatted = format_card_input(raw);
        self.form.update(
            FieldName::CardNumber,
            formatted,
            UpdateOptions {
                emit_event: false,
                mark_dirty: true,
            },
        );
    }

    /// Records a value typed into a field.
    pub fn input(&mut self, field: FieldName, value: &str) {
        self.form.input(field, value);
    }

    /// Marks a field as touched, as when it loses focus.
    pub fn blur(&mut self, field: FieldName) {
        self.form.mark_touched(field);
    }

    /// Loads the default saved card details.
    pub async fn init(&mut self) -> Result<bool, PrefillError> {
        self.load_payment_form(DEFAULT_PREFILL_TOKEN).await
    }

    /// Loads saved card details into the form.
    ///
    /// Returns `Ok(false)` without calling the source when `token` is empty.
    /// The card number is regrouped into blocks of four. The CVC is left
    /// untouched and no field is marked as edited.
    pub async fn load_payment_form(&mut self, token: &str) -> Result<bool, PrefillError> {
        if token.is_empty() {
            return Ok(false);
        }

        let details = self.details.card_details(token).await?;
        debug!(card = %mask_card_number(&details.card_number), "prefilling payment form");

        self.form.patch_values([
            (FieldName::CardNumber, group(&details.card_number).as_str()),
            (FieldName::Expiry, details.expiry.as_str()),
            (FieldName::PostalCode, details.postal_code.as_str()),
        ]);
        Ok(true)
    }

    /// Submits the payment.
    ///
    /// Every field is marked touched and re-validated first, so a rejected
    /// attempt still reveals its errors and the expiry rule sees the current
    /// date. Nothing is sent when the form is invalid or a payment is already
    /// in flight.
    pub async fn submit(&mut self) -> Result<PaymentReceipt, SubmitError> {
        self.form.mark_all_as_touched();
        self.form.revalidate_all();

        if !self.form.is_valid() {
            let invalid_fields: Vec<&'static str> = self
                .form
                .invalid_fields()
                .iter()
                .map(|field| field.name())
                .collect();
            debug!(?invalid_fields, "submit ignored, form is invalid");
            return Err(SubmitError::InvalidForm { invalid_fields });
        }

        let Some(guard) = ProcessingGuard::acquire(&self.status) else {
            debug!("submit ignored, payment already processing");
            return Err(SubmitError::AlreadyProcessing);
        };

        let card_number = self.form.value(FieldName::CardNumber);
        let token = placeholder_token(self.clock.timestamp_millis(), card_number);
        info!(card = %mask_card_number(card_number), "submitting payment");

        let result = self.gateway.submit(&token).await;
        drop(guard);

        let outcome = match &result {
            Ok(_) => {
                info!("payment processed");
                PaymentStatus::Success
            }
            Err(e) => {
                warn!(error = %e, "payment failed");
                PaymentStatus::Failed
            }
        };
        self.status.send_modify(|s| {
            s.processing = false;
            s.payment_status = Some(outcome);
        });

        result.map_err(SubmitError::from)
    }

    /// Clears every field and the payment status.
    pub fn reset(&mut self) {
        self.form.reset();
        self.status.send_modify(|s| {
            s.processing = false;
            s.payment_status = Some(PaymentStatus::Cleared);
        });
    }
}

impl fmt::Debug for PaymentFormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentFormController")
            .field("form", &self.form)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Builder for [`PaymentFormController`].
///
/// Every collaborator is optional:
///
/// | Collaborator | Default |
/// |--------------|---------|
/// | translator | [`MessageCatalog::english`] |
/// | gateway | [`SimulatedGateway::default`] (1.5 s, 95% success) |
/// | card details | [`StaticCardDetails`] |
/// | clock | [`SystemClock`] |
#[derive(Default)]
pub struct ControllerBuilder {
    translator: Option<Arc<dyn Translator>>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    details: Option<Arc<dyn CardDetailsSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ControllerBuilder {
    /// Sets the translation service.
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Sets the payment gateway.
    pub fn gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Uses a simulated gateway with the given settings.
    pub fn gateway_config(self, config: GatewayConfig) -> Self {
        self.gateway(Arc::new(SimulatedGateway::from_config(config)))
    }

    /// Sets the source of saved card details.
    pub fn card_details(mut self, details: Arc<dyn CardDetailsSource>) -> Self {
        self.details = Some(details);
        self
    }

    /// Sets the clock used by the expiry rule and token.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the controller with an empty form.
    pub fn build(self) -> Result<PaymentFormController, ConfigError> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let form = Form::new(payment_form_config(clock.clone())?);
        let (status, _) = watch::channel(FormStatus::default());

        Ok(PaymentFormController {
            form,
            status,
            translator: self
                .translator
                .unwrap_or_else(|| Arc::new(MessageCatalog::english())),
            gateway: self
                .gateway
                .unwrap_or_else(|| Arc::new(SimulatedGateway::default())),
            details: self
                .details
                .unwrap_or_else(|| Arc::new(StaticCardDetails)),
            clock,
        })
    }
}
