//! Card number input masking.
//!
//! The card number field is displayed in blocks of four characters separated
//! by a single space. Formatting happens on every keystroke, so the
//! transformation is idempotent: formatting a formatted value returns it
//! unchanged.
//!
//! # Example
//!
//! ```
//! use payment_form::format::format_card_input;
//!
//! assert_eq!(format_card_input("1234567812345678"), "1234 5678 1234 5678");
//! assert_eq!(format_card_input("1234 56781234 5"), "1234 5678 1234 5");
//!
//! let once = format_card_input("37828224631 0005");
//! assert_eq!(format_card_input(&once), once);
//! ```

/// Size of a displayed card number block.
pub const GROUP_SIZE: usize = 4;

/// Formats raw card number input for display.
///
/// All whitespace is removed, then a single space is inserted after every
/// fourth character. Only whitespace is stripped; any other character is kept
/// and left for the validators to reject.
///
/// # Example
///
/// ```
/// use payment_form::format::format_card_input;
///
/// assert_eq!(format_card_input("4111"), "4111");
/// assert_eq!(format_card_input("41111"), "4111 1");
/// assert_eq!(format_card_input("  "), "");
/// ```
pub fn format_card_input(raw: &str) -> String {
    group(&strip_whitespace(raw))
}

/// Removes every whitespace character.
///
/// Whitespace here is the ECMAScript `\s` set: Unicode `White_Space` except
/// U+0085 (next line), plus U+FEFF (byte order mark).
///
/// # Example
///
/// ```
/// use payment_form::format::strip_whitespace;
///
/// assert_eq!(strip_whitespace("4111 1111\t1111 1111"), "4111111111111111");
/// ```
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|&c| !is_input_whitespace(c)).collect()
}

fn is_input_whitespace(c: char) -> bool {
    match c {
        '\u{FEFF}' => true,
        '\u{0085}' => false,
        _ => c.is_whitespace(),
    }
}

/// Joins blocks of four characters with single spaces.
///
/// Whitespace in the input is not removed, it counts as a character.
pub fn group(input: &str) -> String {
    split_into_groups(input).join(" ")
}

/// Splits a value into blocks of up to four characters.
///
/// The last block holds the remainder (1-4 characters).
///
/// # Example
///
/// ```
/// use payment_form::format::split_into_groups;
///
/// assert_eq!(split_into_groups("378282246310005"), vec!["3782", "8224", "6310", "005"]);
/// assert!(split_into_groups("").is_empty());
/// ```
pub fn split_into_groups(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    chars
        .chunks(GROUP_SIZE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Returns the last four characters of a value (fewer if it is shorter).
///
/// # Example
///
/// ```
/// use payment_form::format::last_four;
///
/// assert_eq!(last_four("1234 5678 1234 5678"), "5678");
/// assert_eq!(last_four("12"), "12");
/// ```
pub fn last_four(value: &str) -> &str {
    let start = value
        .char_indices()
        .rev()
        .nth(GROUP_SIZE - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &value[start..]
}
