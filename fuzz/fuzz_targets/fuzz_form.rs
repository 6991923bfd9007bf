//! Fuzz target for form validation.
//!
//! Feeds arbitrary edits into the payment form and checks that its
//! bookkeeping stays consistent.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use payment_form::clock::FixedClock;
use payment_form::fields::{payment_form_config, FieldName};
use payment_form::form::{FieldKey, Form};
use payment_form::format::format_card_input;
use std::sync::Arc;

#[derive(Debug, Arbitrary)]
enum Edit {
    Input(u8, String),
    Type(String),
    Touch(u8),
    Reset,
}

fuzz_target!(|edits: Vec<Edit>| {
    let Some(clock) = FixedClock::new(2025, 3) else {
        return;
    };
    let Ok(config) = payment_form_config(Arc::new(clock)) else {
        return;
    };
    let mut form = Form::new(config);
    let field = |i: u8| FieldName::ALL[usize::from(i) % FieldName::ALL.len()];

    for edit in edits {
        match edit {
            Edit::Input(i, value) => form.input(field(i), value),
            Edit::Type(raw) => form.input(FieldName::CardNumber, format_card_input(&raw)),
            Edit::Touch(i) => form.mark_touched(field(i)),
            Edit::Reset => form.reset(),
        }
    }

    let invalid = form.invalid_fields();
    assert_eq!(form.is_valid(), invalid.is_empty());
    for &key in FieldName::ALL {
        assert_eq!(form.errors(key).is_empty(), !invalid.contains(&key));
        if form.is_field_invalid(key) {
            assert!(!form.errors(key).is_empty());
        }
    }
});
