//! # payment_form
//!
//! Card payment form engine: input masking, field validation and a
//! simulated submission lifecycle.
//!
//! ## Features
//!
//! - Card number grouping as the user types
//! - Validators for card number, expiry (MM/YY), CVC and postal code
//! - Expiry rule with an injectable clock
//! - Submission state machine with a simulated payment gateway
//! - Pre-fill from saved card details and translated error messages
//!
//! ## Quick Start
//!
//! ```rust
//! use payment_form::format::format_card_input;
//!
//! assert_eq!(format_card_input("1234567812345678"), "1234 5678 1234 5678");
//! assert_eq!(format_card_input("1234 5678 12"), "1234 5678 12");
//! ```
//!
//! ## Field Validation
//!
//! ```rust
//! use std::sync::Arc;
//! use payment_form::clock::FixedClock;
//! use payment_form::fields::{payment_form_config, FieldName};
//! use payment_form::form::Form;
//! use payment_form::ErrorKind;
//!
//! let clock = Arc::new(FixedClock::new(2025, 3).unwrap());
//! let mut form = Form::new(payment_form_config(clock).unwrap());
//!
//! form.input(FieldName::Expiry, "01/25");
//! assert!(form.has_error(FieldName::Expiry, ErrorKind::Expired));
//!
//! form.input(FieldName::Expiry, "03/25");
//! assert!(form.errors(FieldName::Expiry).is_empty());
//!
//! form.input(FieldName::PostalCode, "1234");
//! assert!(form.has_error(FieldName::PostalCode, ErrorKind::MinLength));
//! ```
//!
//! ## Submission
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use payment_form::clock::FixedClock;
//! use payment_form::gateway::{FixedOutcome, SimulatedGateway};
//! use payment_form::{FieldName, PaymentFormController, PaymentStatus, SubmitError};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let mut controller = PaymentFormController::builder()
//!     .clock(Arc::new(FixedClock::new(2025, 3).unwrap()))
//!     .gateway(Arc::new(SimulatedGateway::new(Duration::from_millis(1), FixedOutcome::Fail)))
//!     .build()
//!     .unwrap();
//!
//! // An invalid form never reaches the gateway.
//! assert!(matches!(controller.submit().await, Err(SubmitError::InvalidForm { .. })));
//! assert_eq!(controller.payment_status(), None);
//!
//! controller.on_card_input("1234567812345678");
//! controller.input(FieldName::Expiry, "12/25");
//! controller.input(FieldName::Cvc, "123");
//! controller.input(FieldName::PostalCode, "12345");
//!
//! assert!(matches!(controller.submit().await, Err(SubmitError::Payment(_))));
//! assert_eq!(controller.payment_status(), Some(PaymentStatus::Failed));
//!
//! controller.reset();
//! assert_eq!(controller.payment_status(), Some(PaymentStatus::Cleared));
//! # });
//! ```
//!
//! ## Field Rules
//!
//! | Field | Rules |
//! |-------|-------|
//! | `cardNumber` | required, 15-16 digits grouped by four or contiguous |
//! | `expiry` | required, `MM/YY` or `MMYY`, not before the current month |
//! | `cvc` | required, at most 3 characters, 3-4 digits |
//! | `postalCode` | required, at least 5 characters, `12345` or `12345-6789` |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `cli` | `payform` command-line tool |
//!
//! ## Security
//!
//! - Field values are zeroized when replaced or dropped
//! - `Debug` output masks the card number and CVC
//! - Logs only carry masked card numbers
//! - The submission token is a placeholder, see [`token`]
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod clock;
pub mod controller;
pub mod error;
pub mod expiry;
pub mod fields;
pub mod form;
pub mod format;
pub mod gateway;
pub mod i18n;
pub mod mask;
pub mod prefill;
pub mod rules;
pub mod token;

// Re-export main types at crate root
pub use controller::{ControllerBuilder, FormStatus, PaymentFormController, PaymentStatus};
pub use error::{ErrorKind, FieldError, PaymentError, PrefillError, SubmitError};
pub use fields::FieldName;
pub use format::format_card_input;
pub use gateway::{PaymentGateway, PaymentReceipt, SimulatedGateway};
