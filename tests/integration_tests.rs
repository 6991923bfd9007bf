//! Integration tests for payment_form.
//!
//! These tests drive the controller end to end: typing, validation,
//! submission against fake gateways, reset, pre-fill and translation.

use async_trait::async_trait;
use chrono::NaiveDate;
use payment_form::clock::{Clock, FixedClock};
use payment_form::controller::SubmissionPhase;
use payment_form::form::FieldKey;
use payment_form::gateway::{
    FixedOutcome, SimulatedGateway, SuccessSource, DEFAULT_DELAY, STATUS_PROCESSED,
};
use payment_form::i18n::MessageCatalog;
use payment_form::prefill::{CardDetails, InMemoryCardDetails};
use payment_form::token::decode_placeholder_token;
use payment_form::{
    ErrorKind, FieldName, PaymentError, PaymentFormController, PaymentGateway, PaymentReceipt,
    PaymentStatus, PrefillError, SubmitError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

// =============================================================================
// FIXTURES
// =============================================================================

/// A valid form at March 2025.
mod valid {
    pub const CARD_NUMBER: &str = "1234 5678 1234 5678";
    pub const EXPIRY: &str = "12/25";
    pub const CVC: &str = "123";
    pub const POSTAL_CODE: &str = "12345";
}

/// 2023-11-14T22:13:20Z
const NOW_MILLIS: i64 = 1_700_000_000_000;

/// Records every token it is asked to settle.
struct RecordingGateway {
    calls: AtomicUsize,
    outcome: FixedOutcome,
}

impl RecordingGateway {
    fn new(outcome: FixedOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn submit(&self, token: &str) -> Result<PaymentReceipt, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(DEFAULT_DELAY).await;
        if self.outcome.succeeds() {
            Ok(PaymentReceipt {
                token_id: token.to_string(),
                status: STATUS_PROCESSED.to_string(),
            })
        } else {
            Err(PaymentError::Declined {
                reason: "Error".to_string(),
            })
        }
    }
}

/// A clock the test can move forward.
struct AdjustableClock {
    today: Mutex<NaiveDate>,
}

impl AdjustableClock {
    fn new(year: i32, month: u32) -> Arc<Self> {
        Arc::new(Self {
            today: Mutex::new(NaiveDate::from_ymd_opt(year, month, 1).unwrap()),
        })
    }

    fn set(&self, year: i32, month: u32) {
        *self.today.lock().unwrap() = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    }
}

impl Clock for AdjustableClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }

    fn timestamp_millis(&self) -> i64 {
        NOW_MILLIS
    }
}

fn march_2025() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(2025, 3).unwrap().with_millis(NOW_MILLIS))
}

fn controller_with(gateway: Arc<dyn PaymentGateway>) -> PaymentFormController {
    PaymentFormController::builder()
        .clock(march_2025())
        .gateway(gateway)
        .build()
        .unwrap()
}

fn fill_valid(controller: &mut PaymentFormController) {
    controller.on_card_input(valid::CARD_NUMBER);
    controller.input(FieldName::Expiry, valid::EXPIRY);
    controller.input(FieldName::Cvc, valid::CVC);
    controller.input(FieldName::PostalCode, valid::POSTAL_CODE);
}

// =============================================================================
// SUBMISSION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_submit_success_lifecycle() {
    let gateway = RecordingGateway::new(FixedOutcome::Succeed);
    let mut controller = controller_with(gateway.clone());
    fill_valid(&mut controller);
    let mut status = controller.subscribe();
    let start = Instant::now();

    let (result, during) = tokio::join!(controller.submit(), async {
        status.changed().await.unwrap();
        *status.borrow_and_update()
    });

    // Raised as soon as the submission starts, before any outcome.
    assert!(during.processing);
    assert_eq!(during.payment_status, None);

    let receipt = result.unwrap();
    assert!(start.elapsed() >= DEFAULT_DELAY);
    assert_eq!(gateway.calls(), 1);
    assert_eq!(receipt.status, "PROCESSED");
    assert_eq!(controller.payment_status(), Some(PaymentStatus::Success));
    assert!(!controller.is_processing());
    assert_eq!(controller.status().phase(), SubmissionPhase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_submit_failure_lifecycle() {
    let gateway = RecordingGateway::new(FixedOutcome::Fail);
    let mut controller = controller_with(gateway.clone());
    fill_valid(&mut controller);
    let mut status = controller.subscribe();

    let (result, during) = tokio::join!(controller.submit(), async {
        status.changed().await.unwrap();
        *status.borrow_and_update()
    });

    assert!(during.processing);
    assert!(matches!(
        result,
        Err(SubmitError::Payment(PaymentError::Declined { .. }))
    ));
    assert_eq!(gateway.calls(), 1);
    assert_eq!(controller.payment_status(), Some(PaymentStatus::Failed));
    assert!(!controller.is_processing());
}

#[tokio::test(start_paused = true)]
async fn test_submit_with_empty_field_never_calls_gateway() {
    for &missing in FieldName::ALL {
        let gateway = RecordingGateway::new(FixedOutcome::Succeed);
        let mut controller = controller_with(gateway.clone());
        fill_valid(&mut controller);
        controller.input(missing, "");

        let err = controller.submit().await.unwrap_err();

        assert_eq!(
            err,
            SubmitError::InvalidForm {
                invalid_fields: vec![missing.name()]
            }
        );
        assert_eq!(gateway.calls(), 0, "{}", missing);
        assert!(!controller.is_processing());
        assert_eq!(controller.payment_status(), None);
    }
}

#[tokio::test(start_paused = true)]
async fn test_rejected_submit_marks_all_touched() {
    let gateway = RecordingGateway::new(FixedOutcome::Succeed);
    let mut controller = controller_with(gateway);

    for &field in FieldName::ALL {
        assert!(!controller.is_field_invalid(field));
    }

    assert!(controller.submit().await.is_err());

    for &field in FieldName::ALL {
        assert!(controller.form().field(field).is_touched());
        assert!(controller.is_field_invalid(field));
        assert!(controller.has_error(field, ErrorKind::Required));
    }
}

#[tokio::test(start_paused = true)]
async fn test_submit_token_encodes_time_and_last_four() {
    let mut controller = controller_with(Arc::new(SimulatedGateway::new(
        DEFAULT_DELAY,
        FixedOutcome::Succeed,
    )));
    fill_valid(&mut controller);

    let receipt = controller.submit().await.unwrap();

    assert_eq!(receipt.token_id, "dG9rXzE3MDAwMDAwMDAwMDBfNTY3OA==");
    assert_eq!(
        decode_placeholder_token(&receipt.token_id).unwrap(),
        "tok_1700000000000_5678"
    );
}

#[tokio::test(start_paused = true)]
async fn test_resubmit_after_failure() {
    let gateway = RecordingGateway::new(FixedOutcome::Fail);
    let mut controller = controller_with(gateway.clone());
    fill_valid(&mut controller);
    assert!(controller.submit().await.is_err());

    // Resubmitting is allowed from a terminal state.
    assert!(controller.submit().await.is_err());
    assert_eq!(gateway.calls(), 2);
    assert_eq!(controller.payment_status(), Some(PaymentStatus::Failed));
}

#[tokio::test(start_paused = true)]
async fn test_expired_card_is_not_submitted() {
    let gateway = RecordingGateway::new(FixedOutcome::Succeed);
    let mut controller = controller_with(gateway.clone());
    fill_valid(&mut controller);
    controller.input(FieldName::Expiry, "02/25");

    let err = controller.submit().await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::InvalidForm {
            invalid_fields: vec!["expiry"]
        }
    );
    assert!(controller.has_error(FieldName::Expiry, ErrorKind::Expired));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submit_rechecks_expiry_against_current_date() {
    let clock = AdjustableClock::new(2025, 3);
    let gateway = RecordingGateway::new(FixedOutcome::Succeed);
    let mut controller = PaymentFormController::builder()
        .clock(clock.clone())
        .gateway(gateway.clone())
        .build()
        .unwrap();
    fill_valid(&mut controller);
    controller.input(FieldName::Expiry, "03/25");
    assert!(controller.form().errors(FieldName::Expiry).is_empty());

    // The month runs out between typing and submitting.
    clock.set(2025, 4);
    let err = controller.submit().await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::InvalidForm {
            invalid_fields: vec!["expiry"]
        }
    );
    assert!(controller.has_error(FieldName::Expiry, ErrorKind::Expired));
    assert_eq!(
        controller.visible_errors(FieldName::Expiry),
        vec!["This card has expired".to_string()]
    );
    assert_eq!(gateway.calls(), 0);
    assert_eq!(controller.payment_status(), None);
}

// =============================================================================
// RESET
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_reset_from_every_state() {
    for outcome in [None, Some(FixedOutcome::Succeed), Some(FixedOutcome::Fail)] {
        let gateway = RecordingGateway::new(outcome.unwrap_or(FixedOutcome::Succeed));
        let mut controller = controller_with(gateway);
        fill_valid(&mut controller);
        if outcome.is_some() {
            let _ = controller.submit().await;
        }

        controller.reset();

        assert_eq!(controller.payment_status(), Some(PaymentStatus::Cleared));
        assert_eq!(controller.payment_status().unwrap().as_str(), "");
        assert!(!controller.is_processing());
        assert_eq!(controller.status().phase(), SubmissionPhase::Idle);
        for &field in FieldName::ALL {
            assert_eq!(controller.form().value(field), "");
            assert!(!controller.is_field_invalid(field));
        }
    }
}

// =============================================================================
// CARD NUMBER INPUT
// =============================================================================

#[test]
fn test_typing_card_number() {
    let mut controller = controller_with(RecordingGateway::new(FixedOutcome::Succeed));

    // Each keystroke appends to the already formatted value.
    for digit in "123456781234567".chars() {
        let typed = format!("{}{}", controller.form().value(FieldName::CardNumber), digit);
        controller.on_card_input(&typed);
    }

    assert_eq!(
        controller.form().value(FieldName::CardNumber),
        "1234 5678 1234 567"
    );
    assert!(controller.form().errors(FieldName::CardNumber).is_empty());
    assert!(controller.form().field(FieldName::CardNumber).is_dirty());
}

#[test]
fn test_partial_card_number_shows_error_once_edited() {
    let mut controller = controller_with(RecordingGateway::new(FixedOutcome::Succeed));

    controller.on_card_input("1234 56");

    assert_eq!(controller.form().value(FieldName::CardNumber), "1234 56");
    assert!(controller.is_field_invalid(FieldName::CardNumber));
    assert_eq!(
        controller.visible_errors(FieldName::CardNumber),
        vec!["Enter a valid 15 or 16 digit card number".to_string()]
    );
}

// =============================================================================
// PREFILL
// =============================================================================

#[tokio::test]
async fn test_init_loads_default_card() {
    let mut controller = controller_with(RecordingGateway::new(FixedOutcome::Succeed));

    assert!(controller.init().await.unwrap());

    let form = controller.form();
    assert_eq!(form.value(FieldName::CardNumber), "4000 0566 5566 5556");
    assert_eq!(form.value(FieldName::Expiry), "12/27");
    assert_eq!(form.value(FieldName::PostalCode), "06614");
    assert_eq!(form.value(FieldName::Cvc), "");

    // Loaded values are valid but the CVC is still required.
    assert!(form.errors(FieldName::CardNumber).is_empty());
    assert!(form.errors(FieldName::Expiry).is_empty());
    assert_eq!(form.invalid_fields(), vec![FieldName::Cvc]);
    assert!(!form.field(FieldName::CardNumber).is_dirty());
    assert!(!controller.is_field_invalid(FieldName::Cvc));
}

#[tokio::test]
async fn test_prefill_with_empty_token_is_noop() {
    let mut controller = PaymentFormController::builder()
        .clock(march_2025())
        .card_details(Arc::new(InMemoryCardDetails::new()))
        .build()
        .unwrap();

    assert_eq!(controller.load_payment_form("").await, Ok(false));
    assert_eq!(controller.form().value(FieldName::CardNumber), "");
}

#[tokio::test]
async fn test_prefill_unknown_token() {
    let details = InMemoryCardDetails::new().with(
        "known",
        CardDetails {
            card_number: "378282246310005".to_string(),
            expiry: "01/26".to_string(),
            postal_code: "94105".to_string(),
        },
    );
    let mut controller = PaymentFormController::builder()
        .clock(march_2025())
        .card_details(Arc::new(details))
        .build()
        .unwrap();

    assert_eq!(
        controller.load_payment_form("missing").await,
        Err(PrefillError::NotFound {
            token: "missing".to_string()
        })
    );

    assert!(controller.load_payment_form("known").await.unwrap());
    assert_eq!(
        controller.form().value(FieldName::CardNumber),
        "3782 8224 6310 005"
    );
    assert!(controller.form().errors(FieldName::CardNumber).is_empty());
}

// =============================================================================
// TRANSLATION
// =============================================================================

#[test]
fn test_error_messages_follow_language() {
    let catalog = Arc::new(MessageCatalog::english());
    catalog
        .load_json(
            "es",
            r#"{"errors": {"cvc": {"maxlength": "El CVC es demasiado largo"}}}"#,
        )
        .unwrap();
    let mut controller = PaymentFormController::builder()
        .clock(march_2025())
        .translator(catalog)
        .build()
        .unwrap();

    controller.input(FieldName::Cvc, "1234");
    assert_eq!(
        controller.visible_errors(FieldName::Cvc),
        vec!["CVC is too long".to_string()]
    );

    controller.set_language("es");
    assert_eq!(
        controller.visible_errors(FieldName::Cvc),
        vec!["El CVC es demasiado largo".to_string()]
    );

    // Keys missing from the active language fall back to English.
    assert_eq!(
        controller.error_message(FieldName::Cvc, ErrorKind::Required),
        "CVC is required"
    );

    // Empty and unknown codes leave the language unchanged.
    controller.set_language("");
    controller.set_language("de");
    assert_eq!(
        controller.error_message(FieldName::Cvc, ErrorKind::MaxLength),
        "El CVC es demasiado largo"
    );
}
