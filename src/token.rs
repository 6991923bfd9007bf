//! Placeholder submission token.
//!
//! # Security Note
//!
//! This token is NOT secure. It is built on the client from a timestamp and
//! the last four characters of the card number, then base64 encoded, which
//! anyone can reverse. It only stands in for a token issued by a certified
//! tokenization service and must not be used with a real payment processor.

use crate::format::last_four;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Prefix of every placeholder token before encoding.
pub const TOKEN_PREFIX: &str = "tok_";

/// Builds the placeholder token `base64("tok_<millis>_<last four>")`.
///
/// # Example
///
/// ```
/// use payment_form::token::placeholder_token;
///
/// let token = placeholder_token(1700000000000, "1234 5678 1234 5678");
/// assert_eq!(token, "dG9rXzE3MDAwMDAwMDAwMDBfNTY3OA==");
/// ```
pub fn placeholder_token(timestamp_millis: i64, card_number: &str) -> String {
    let raw = format!(
        "{}{}_{}",
        TOKEN_PREFIX,
        timestamp_millis,
        last_four(card_number)
    );
    STANDARD.encode(raw.as_bytes())
}

/// Decodes a placeholder token back into its text form.
///
/// Returns `None` if the token is not valid base64 text.
pub fn decode_placeholder_token(token: &str) -> Option<String> {
    let bytes = STANDARD.decode(token).ok()?;
    String::from_utf8(bytes).ok()
}
