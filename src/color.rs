//! Color parsing and hardware color conversion
//!
//! Palette specs write colors as CSS-style hex:
//! - `#RGB` - 3-digit hex, each digit is doubled (e.g., `#F00` -> red)
//! - `#RRGGBB` - 6-digit hex
//!
//! Parsed colors are always opaque. Hardware palettes store colors as 15-bit
//! CGB words (5 bits per channel), with one out-of-range word reserved for
//! transparency.

use image::Rgba;
use thiserror::Error;

/// CGB word standing for "transparent"; no opaque color maps to it.
pub const TRANSPARENT: u16 = 0x8000;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Invalid length (must be 3 or 6 hex chars after #)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Parse `RGB` or `RRGGBB` hex digits without the leading `#`.
///
/// # Examples
///
/// ```
/// use tilegfx::color::parse_hex_digits;
///
/// assert_eq!(parse_hex_digits("F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_hex_digits("0080ff").unwrap(), image::Rgba([0, 128, 255, 255]));
/// ```
pub fn parse_hex_digits(hex: &str) -> Result<Rgba<u8>, ColorError> {
    if let Some(c) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex(c));
    }

    let digits: Vec<u8> = hex.bytes().map(hex_digit).collect();
    match digits.as_slice() {
        // #RGB -> #RRGGBB (doubled digits)
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255])),
        _ => Err(ColorError::InvalidLength(hex.len())),
    }
}

/// Value of an ASCII hex digit already known to be valid.
fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Format a color as `#rrggbb`.
pub fn to_css(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Convert a color to its 15-bit CGB word.
///
/// Channels are truncated to 5 bits and packed red-low, so the result never
/// collides with [`TRANSPARENT`].
pub fn cgb_color(color: Rgba<u8>) -> u16 {
    let [r, g, b, _] = color.0;
    u16::from(r >> 3) | u16::from(g >> 3) << 5 | u16::from(b >> 3) << 10
}
