//! Fuzz target for card number formatting.
//!
//! Tests that formatting and masking never panic on arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use payment_form::{format, mask, token};

fuzz_target!(|data: &str| {
    // These should never panic
    let formatted = format::format_card_input(data);
    let _ = format::split_into_groups(data);
    let _ = format::last_four(data);
    let _ = mask::mask_card_number(data);
    let _ = mask::mask_secret(data);
    let _ = token::placeholder_token(0, data);

    assert_eq!(
        format::format_card_input(&formatted),
        formatted,
        "Formatting should be idempotent"
    );
    assert_eq!(
        format::strip_whitespace(&formatted),
        format::strip_whitespace(data),
        "Formatting should only move whitespace"
    );
});
