//! Fuzz target for the expiry rule.
//!
//! Tests that expiry checking never panics on arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use payment_form::clock::YearMonth;
use payment_form::expiry::{check_expiry, ExpiryDate};

fuzz_target!(|input: (&str, u8, u8)| {
    let (data, year, month) = input;
    let Some(now) = YearMonth::new(year % 100, month % 12 + 1) else {
        return;
    };

    // These should never panic
    let _ = check_expiry(data, now);

    if let Some(date) = ExpiryDate::parse(data) {
        // A well-formed date only fails when it is expired.
        assert_eq!(check_expiry(data, now).is_err(), date.is_expired_at(now));
        let _ = date.months_until(now);
        let _ = date.to_string();
    }
});
