//! Numeric literal parsing for option values
//!
//! Numbers are unsigned 16-bit and may carry a base prefix:
//! - `$` or `0x`/`0X` for hexadecimal
//! - `%` or `0b`/`0B` for binary
//! - no prefix for decimal
//!
//! Parsing works on a string cursor (`&mut &str`): on return the cursor sits on
//! the first character that is not a digit of the detected base, so callers can
//! go on to parse separators of composite values such as `5,10:20,30`.

use crate::diagnostics::Diagnostics;

/// Parse a base-prefixed number at the start of `cursor`.
///
/// On failure a recoverable error labelled with `label` is recorded and
/// `err_val` is returned. A value is rejected as too large once it reaches
/// 65535.
///
/// # Examples
///
/// ```
/// use tilegfx::diagnostics::Diagnostics;
/// use tilegfx::number::parse_number;
///
/// let mut diag = Diagnostics::new();
/// let mut cursor = "$1F,2";
/// assert_eq!(parse_number(&mut cursor, "Bank 0 base tile ID", 0, &mut diag), 31);
/// assert_eq!(cursor, ",2");
/// assert!(!diag.has_errors());
/// ```
pub fn parse_number(cursor: &mut &str, label: &str, err_val: u16, diag: &mut Diagnostics) -> u16 {
    let input = *cursor;
    if input.is_empty() {
        diag.error(format!("{}: expected number, but found nothing", label));
        return err_val;
    }

    let (base, digits) = split_base_prefix(input);
    *cursor = digits;

    let bytes = digits.as_bytes();
    if bytes.first().and_then(|&c| digit_value(c, base)).is_none() {
        let after = if base != 10 { " after base" } else { "" };
        diag.error(format!("{}: expected digit{}, but found nothing", label, after));
        return err_val;
    }

    let mut value: u32 = 0;
    let mut consumed = 0;
    for &c in bytes {
        let Some(digit) = digit_value(c, base) else {
            break;
        };
        consumed += 1;
        value = value * base + digit;
        if value >= u32::from(u16::MAX) {
            *cursor = &digits[consumed..];
            diag.error(format!("{}: the number is too large!", label));
            return err_val;
        }
    }

    // Digits are ASCII, so `consumed` is always a char boundary
    *cursor = &digits[consumed..];
    value as u16
}

/// Detect the base prefix, returning the base and the text after the prefix.
fn split_base_prefix(input: &str) -> (u32, &str) {
    if let Some(rest) = input.strip_prefix('$') {
        (16, rest)
    } else if let Some(rest) = input.strip_prefix('%') {
        (2, rest)
    } else if let Some(rest) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = input.strip_prefix("0b").or_else(|| input.strip_prefix("0B")) {
        (2, rest)
    } else {
        (10, input)
    }
}

/// Value of `c` as a digit in `base`, if it is one.
fn digit_value(c: u8, base: u32) -> Option<u32> {
    let value = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => return None,
    };
    let value = u32::from(value);
    (value < base).then_some(value)
}

/// Skip spaces and tabs.
pub fn skip_whitespace(cursor: &mut &str) {
    *cursor = cursor.trim_start_matches([' ', '\t']);
}

/// Consume `sep` if it is the next character.
pub fn eat_separator(cursor: &mut &str, sep: char) -> bool {
    match cursor.strip_prefix(sep) {
        Some(rest) => {
            *cursor = rest;
            true
        }
        None => false,
    }
}
