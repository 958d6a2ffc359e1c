//! Explicit palette specs
//!
//! Palettes can be given on the command line (`-c '#fff,#aaa;#000'`) or in a
//! palette file (`-c [fmt:]path`). Inline specs are parsed as soon as they are
//! seen. Palette files hold a flat list of colors that is split into palettes
//! of the final palette size, so they are parsed only after every argument is
//! known.
//!
//! Supported palette file formats:
//! - `hex`: one `rrggbb` color per line, optionally prefixed by `#`
//! - `gpl`: GIMP palette (`GIMP Palette` header, then `r g b [name]` rows)

use crate::color::parse_hex_digits;
use crate::config::SpecPalette;
use crate::diagnostics::Diagnostics;
use crate::number::skip_whitespace;
use image::Rgba;
use std::fs;
use std::path::Path;

/// Maximum number of palettes a spec may define.
const MAX_PALETTES: usize = 256;

/// Palette file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteFormat {
    Hex,
    Gpl,
}

impl PaletteFormat {
    /// Look up a format by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("hex") {
            Some(Self::Hex)
        } else if name.eq_ignore_ascii_case("gpl") {
            Some(Self::Gpl)
        } else {
            None
        }
    }
}

/// Parse an inline palette spec: `;`-separated palettes of `,`-separated colors.
///
/// Parsing stops at the first malformed color or separator; palettes parsed
/// up to that point are kept.
pub fn parse_inline_pal_spec(spec: &str, diag: &mut Diagnostics) -> Vec<SpecPalette> {
    let mut palettes: Vec<SpecPalette> = vec![[None; 4]];
    let mut slot = 0;
    let mut cursor = spec;

    loop {
        skip_whitespace(&mut cursor);
        if cursor.is_empty() {
            break;
        }

        let Some(after_hash) = cursor.strip_prefix('#') else {
            let c = cursor.chars().next().unwrap_or_default();
            diag.error(format!(
                "Unexpected character '{}' in palette spec \"{}\", expected '#'",
                c, spec
            ));
            break;
        };
        let end = after_hash.find(|c: char| !c.is_ascii_hexdigit()).unwrap_or(after_hash.len());
        let (digits, rest) = after_hash.split_at(end);
        let color = match parse_hex_digits(digits) {
            Ok(color) => color,
            Err(e) => {
                diag.error(format!(
                    "Failed to parse color \"#{}\" in palette spec \"{}\": {}",
                    digits, spec, e
                ));
                break;
            }
        };
        cursor = rest;

        if slot == 4 {
            diag.error(format!("Each palette can only contain up to 4 colors (in \"{}\")", spec));
            break;
        }
        if let Some(palette) = palettes.last_mut() {
            palette[slot] = Some(color);
        }
        slot += 1;

        skip_whitespace(&mut cursor);
        let mut chars = cursor.chars();
        match chars.next() {
            None => break,
            Some(',') => cursor = chars.as_str(),
            Some(';') => {
                cursor = chars.as_str();
                if palettes.len() == MAX_PALETTES {
                    diag.error(format!(
                        "Palette spec \"{}\" defines more than {} palettes",
                        spec, MAX_PALETTES
                    ));
                    break;
                }
                palettes.push([None; 4]);
                slot = 0;
            }
            Some(c) => {
                diag.error(format!(
                    "Unexpected character '{}' in palette spec \"{}\", expected ',' or ';'",
                    c, spec
                ));
                break;
            }
        }
    }

    // A trailing `;` leaves an empty palette behind
    if palettes.len() > 1 && palettes.last() == Some(&[None; 4]) {
        palettes.pop();
    }
    palettes
}

/// Split `fmt:path` into its format and path, falling back to the extension.
fn split_format(spec: &str) -> (Option<PaletteFormat>, &str) {
    if let Some((name, path)) = spec.split_once(':') {
        if let Some(format) = PaletteFormat::from_name(name) {
            return (Some(format), path);
        }
    }
    let format = Path::new(spec)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(PaletteFormat::from_name);
    (format, spec)
}

/// Parse a palette file, splitting its colors into palettes of `nb_colors`.
pub fn parse_external_pal_spec(spec: &str, nb_colors: u8, diag: &mut Diagnostics) -> Vec<SpecPalette> {
    let (format, path) = split_format(spec);
    let Some(format) = format else {
        diag.error(format!(
            "Cannot tell the format of palette file \"{}\"; use `hex:` or `gpl:` before the path",
            spec
        ));
        return Vec::new();
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            diag.error(format!("Failed to open palette file \"{}\": {}", path, e));
            return Vec::new();
        }
    };

    let colors = match format {
        PaletteFormat::Hex => parse_hex_file(&contents, path, diag),
        PaletteFormat::Gpl => parse_gpl_file(&contents, path, diag),
    };

    let nb_colors = usize::from(nb_colors.clamp(1, 4));
    if colors.len() > nb_colors * MAX_PALETTES {
        diag.error(format!(
            "Palette file \"{}\" contains {} colors, but at most {} fit in {} palettes",
            path,
            colors.len(),
            nb_colors * MAX_PALETTES,
            MAX_PALETTES
        ));
    }

    colors
        .chunks(nb_colors)
        .take(MAX_PALETTES)
        .map(|chunk| {
            let mut palette: SpecPalette = [None; 4];
            for (slot, color) in palette.iter_mut().zip(chunk) {
                *slot = Some(*color);
            }
            palette
        })
        .collect()
}

fn parse_hex_file(contents: &str, path: &str, diag: &mut Diagnostics) -> Vec<Rgba<u8>> {
    let mut colors = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let digits = line.strip_prefix('#').unwrap_or(line);
        if digits.len() != 6 {
            diag.error(format!(
                "Expected a 6-digit color on line {} of \"{}\", found \"{}\"",
                line_no + 1,
                path,
                line
            ));
            continue;
        }
        match parse_hex_digits(digits) {
            Ok(color) => colors.push(color),
            Err(e) => diag.error(format!(
                "Failed to parse color \"{}\" on line {} of \"{}\": {}",
                line,
                line_no + 1,
                path,
                e
            )),
        }
    }
    colors
}

fn parse_gpl_file(contents: &str, path: &str, diag: &mut Diagnostics) -> Vec<Rgba<u8>> {
    let mut lines = contents.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, header)) if header.trim() == "GIMP Palette" => {}
        _ => {
            diag.error(format!("\"{}\" is not a GIMP palette (missing \"GIMP Palette\" header)", path));
            return Vec::new();
        }
    }

    let mut colors = Vec::new();
    for (line_no, line) in lines {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with("Name:") || line.starts_with("Columns:") {
            continue;
        }
        let channels: Vec<Option<u8>> =
            line.split_whitespace().take(3).map(|c| c.parse().ok()).collect();
        match channels.as_slice() {
            [Some(r), Some(g), Some(b)] => colors.push(Rgba([*r, *g, *b, 255])),
            _ => diag.error(format!(
                "Expected \"red green blue\" on line {} of \"{}\", found \"{}\"",
                line_no + 1,
                path,
                line
            )),
        }
    }
    colors
}
