//! Option table and single-pass option resolution
//!
//! [`OptionResolver::scan`] walks one argument frame left to right, applying
//! every recognized option to an [`OptionsBuilder`]. It stops early when it
//! meets a positional `@path` argument, handing the response file back to the
//! caller, or when an option such as `--version` ends the run.
//!
//! Option syntax follows getopt conventions: short options can be clustered
//! (`-mu`) and take their value attached or as the next argument (`-d1`,
//! `-d 1`); long options take `--name=value` or `--name value` and may be
//! abbreviated to any unambiguous prefix; `--` ends option parsing for the
//! current frame.
//!
//! A single dash may also introduce a long option (`-depth 1`,
//! `-mirror-tiles`). Such a token is read as short options whenever the long
//! lookup fails, is ambiguous, or names a single letter that is also a short
//! option, so `-mu` and `-d1` keep their usual meaning.

use crate::args::Frame;
use crate::config::{Options, OptionsBuilder, PalSpecKind, VERB_MAX};
use crate::diagnostics::{Diagnostics, FatalError, Origin};
use crate::number::{eat_separator, parse_number, skip_whitespace};
use crate::palette_spec::parse_inline_pal_spec;
use clap_lex::OsStrExt;
use std::ffi::OsStr;
use std::path::PathBuf;

/// What an option does once recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    AutoAttrMap,
    AttrMap,
    BaseTiles,
    ColorCurve,
    Colors,
    Depth,
    Help,
    Slice,
    MirrorTiles,
    NbTiles,
    NbPalettes,
    GroupOutputs,
    Output,
    AutoPalette,
    Palette,
    AutoPaletteMap,
    PaletteMap,
    Reverse,
    PaletteSize,
    AutoTilemap,
    Tilemap,
    UniqueTiles,
    Version,
    Verbose,
    TrimEnd,
    Columns,
}

/// One spelling of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    pub short: Option<char>,
    pub long: &'static str,
    pub flag: Flag,
    pub takes_value: bool,
    /// Long name of the replacement, for deprecated spellings
    pub replaced_by: Option<&'static str>,
}

const fn switch(short: char, long: &'static str, flag: Flag) -> OptionSpec {
    OptionSpec { short: Some(short), long, flag, takes_value: false, replaced_by: None }
}

const fn valued(short: char, long: &'static str, flag: Flag) -> OptionSpec {
    OptionSpec { short: Some(short), long, flag, takes_value: true, replaced_by: None }
}

const fn deprecated(long: &'static str, flag: Flag, replaced_by: &'static str) -> OptionSpec {
    OptionSpec { short: None, long, flag, takes_value: false, replaced_by: Some(replaced_by) }
}

/// Every accepted option, in short-option order.
pub static OPTIONS: &[OptionSpec] = &[
    switch('A', "auto-attr-map", Flag::AutoAttrMap),
    deprecated("output-attr-map", Flag::AutoAttrMap, "auto-attr-map"),
    valued('a', "attr-map", Flag::AttrMap),
    valued('b', "base-tiles", Flag::BaseTiles),
    switch('C', "color-curve", Flag::ColorCurve),
    valued('c', "colors", Flag::Colors),
    valued('d', "depth", Flag::Depth),
    switch('h', "help", Flag::Help),
    valued('L', "slice", Flag::Slice),
    switch('m', "mirror-tiles", Flag::MirrorTiles),
    valued('N', "nb-tiles", Flag::NbTiles),
    valued('n', "nb-palettes", Flag::NbPalettes),
    switch('O', "group-outputs", Flag::GroupOutputs),
    valued('o', "output", Flag::Output),
    switch('P', "auto-palette", Flag::AutoPalette),
    deprecated("output-palette", Flag::AutoPalette, "auto-palette"),
    valued('p', "palette", Flag::Palette),
    switch('Q', "auto-palette-map", Flag::AutoPaletteMap),
    deprecated("output-palette-map", Flag::AutoPaletteMap, "auto-palette-map"),
    valued('q', "palette-map", Flag::PaletteMap),
    valued('r', "reverse", Flag::Reverse),
    valued('s', "palette-size", Flag::PaletteSize),
    switch('T', "auto-tilemap", Flag::AutoTilemap),
    deprecated("output-tilemap", Flag::AutoTilemap, "auto-tilemap"),
    valued('t', "tilemap", Flag::Tilemap),
    switch('u', "unique-tiles", Flag::UniqueTiles),
    switch('V', "version", Flag::Version),
    switch('v', "verbose", Flag::Verbose),
    valued('x', "trim-end", Flag::TrimEnd),
    switch('Z', "columns", Flag::Columns),
];

fn lookup_short(c: char) -> Result<&'static OptionSpec, FatalError> {
    OPTIONS
        .iter()
        .find(|spec| spec.short == Some(c))
        .ok_or_else(|| FatalError::UnknownOption(format!("-{}", c)))
}

/// Find a long option by exact name, or by unambiguous prefix.
fn lookup_long(name: &str) -> Result<&'static OptionSpec, FatalError> {
    if let Some(spec) = OPTIONS.iter().find(|spec| spec.long == name) {
        return Ok(spec);
    }
    if name.is_empty() {
        return Err(FatalError::UnknownOption("--".to_string()));
    }
    let mut candidates = OPTIONS.iter().filter(|spec| spec.long.starts_with(name));
    match (candidates.next(), candidates.next()) {
        (Some(spec), None) => Ok(spec),
        (Some(_), Some(_)) => Err(FatalError::AmbiguousOption(name.to_string())),
        _ => Err(FatalError::UnknownOption(format!("--{}", name))),
    }
}

/// Find a long option spelled with a single dash, `name[=value]`.
///
/// Returns `None` when the token should be read as short options instead.
fn lookup_single_dash(text: &str) -> Option<(&'static OptionSpec, Option<&OsStr>)> {
    let (name, attached) = match text.split_once('=') {
        Some((name, value)) => (name, Some(OsStr::new(value))),
        None => (text, None),
    };
    if name.is_empty() {
        return None;
    }
    if let Some(spec) = OPTIONS.iter().find(|spec| spec.long == name) {
        return Some((spec, attached));
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if OPTIONS.iter().any(|spec| spec.short == Some(c)) {
            return None;
        }
    }

    let mut candidates = OPTIONS.iter().filter(|spec| spec.long.starts_with(name));
    match (candidates.next(), candidates.next()) {
        (Some(spec), None) => Some((spec, attached)),
        _ => None,
    }
}

/// An option that ends argument processing on the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyExit {
    Version,
    Help,
}

/// Why a frame scan stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// Every argument of the frame has been consumed
    Exhausted,
    /// A `--` was met; the rest of the frame are input paths
    Escaped,
    /// A `@path` argument asks for a response file to be expanded
    ResponseFile(PathBuf),
    Exit(EarlyExit),
}

/// Applies options from successive frames to one [`OptionsBuilder`].
#[derive(Debug, Default)]
pub struct OptionResolver {
    builder: OptionsBuilder,
}

impl OptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder(&self) -> &OptionsBuilder {
        &self.builder
    }

    pub fn into_builder(self) -> OptionsBuilder {
        self.builder
    }

    /// Scan `frame` from its current position.
    pub fn scan(&mut self, frame: &mut Frame, diag: &mut Diagnostics) -> Result<Scan, FatalError> {
        let Frame { args, cursor, file, consumed, .. } = frame;

        while let Some(arg) = args.next(cursor) {
            diag.set_origin(Some(Origin { file: file.clone(), index: *consumed }));
            *consumed += 1;

            if arg.is_escape() {
                return Ok(Scan::Escaped);
            }

            let long = match arg.to_long() {
                Some((name, attached)) => {
                    let name = name.map_err(|raw| {
                        FatalError::UnknownOption(format!("--{}", raw.to_string_lossy()))
                    })?;
                    Some((lookup_long(name)?, attached))
                }
                None => arg
                    .to_value()
                    .ok()
                    .and_then(|text| text.strip_prefix('-'))
                    .and_then(lookup_single_dash),
            };

            if let Some((spec, attached)) = long {
                let value = match (spec.takes_value, attached) {
                    (false, None) => None,
                    (false, Some(_)) => {
                        return Err(FatalError::UnexpectedArgument(spec.long.to_string()))
                    }
                    (true, Some(value)) => Some(value),
                    (true, None) => {
                        *consumed += 1;
                        let value = args.next_os(cursor).ok_or_else(|| {
                            FatalError::MissingArgument(format!("--{}", spec.long))
                        })?;
                        Some(value)
                    }
                };
                if let Some(exit) = self.apply(spec, value, diag)? {
                    return Ok(Scan::Exit(exit));
                }
            } else if let Some(mut shorts) = arg.to_short() {
                while let Some(c) = shorts.next_flag() {
                    let c = c.map_err(|raw| {
                        FatalError::UnknownOption(format!("-{}", raw.to_string_lossy()))
                    })?;
                    let spec = lookup_short(c)?;
                    let value = if !spec.takes_value {
                        None
                    } else if let Some(value) = shorts.next_value_os() {
                        Some(value)
                    } else {
                        *consumed += 1;
                        let value = args
                            .next_os(cursor)
                            .ok_or_else(|| FatalError::MissingArgument(format!("-{}", c)))?;
                        Some(value)
                    };
                    if let Some(exit) = self.apply(spec, value, diag)? {
                        return Ok(Scan::Exit(exit));
                    }
                }
            } else {
                let value = arg.to_value_os();
                if let Some(path) = value.strip_prefix("@") {
                    return Ok(Scan::ResponseFile(PathBuf::from(path)));
                }
                self.register_input(value)?;
            }
        }

        Ok(Scan::Exhausted)
    }

    /// Register whatever follows `--` in `frame` as input paths.
    pub fn register_remaining(
        &mut self,
        frame: &mut Frame,
        diag: &mut Diagnostics,
    ) -> Result<(), FatalError> {
        let Frame { args, cursor, file, consumed, .. } = frame;
        for arg in args.remaining(cursor) {
            diag.set_origin(Some(Origin { file: file.clone(), index: *consumed }));
            *consumed += 1;
            self.register_input(arg)?;
        }
        Ok(())
    }

    fn register_input(&mut self, arg: &OsStr) -> Result<(), FatalError> {
        let input = &mut self.builder.options.input;
        if let Some(first) = input {
            return Err(FatalError::DuplicateInput {
                first: first.clone(),
                second: PathBuf::from(arg),
            });
        }
        if arg.is_empty() {
            return Err(FatalError::EmptyInput);
        }
        *input = Some(PathBuf::from(arg));
        Ok(())
    }

    fn apply(
        &mut self,
        spec: &OptionSpec,
        value: Option<&OsStr>,
        diag: &mut Diagnostics,
    ) -> Result<Option<EarlyExit>, FatalError> {
        if let Some(replacement) = spec.replaced_by {
            diag.warning(format!("`--{}` is deprecated, use `--{}` instead", spec.long, replacement));
        }
        tracing::trace!(option = spec.long, "applying option");

        let text = value.map(OsStr::to_string_lossy).unwrap_or_default();
        let path = || value.map(PathBuf::from).unwrap_or_default();
        let OptionsBuilder { options, deferred } = &mut self.builder;

        match spec.flag {
            Flag::AutoAttrMap => deferred.auto_attrmap = true,
            Flag::AttrMap => {
                deferred.auto_attrmap = false;
                set_path(&mut options.attrmap, path(), "attrmap", diag);
            }
            Flag::BaseTiles => parse_base_tiles(options, &text, diag),
            Flag::ColorCurve => options.use_color_curve = true,
            Flag::Colors => {
                if text.starts_with('#') {
                    options.pal_spec_kind = PalSpecKind::Explicit;
                    options.pal_spec = parse_inline_pal_spec(&text, diag);
                    deferred.external_pal_spec = None;
                } else if text.eq_ignore_ascii_case("embedded") {
                    options.pal_spec_kind = PalSpecKind::Embedded;
                    options.pal_spec.clear();
                    deferred.external_pal_spec = None;
                } else {
                    // A flat color list can only be split into palettes once
                    // the palette size is known
                    options.pal_spec_kind = PalSpecKind::Explicit;
                    deferred.external_pal_spec = Some(text.into_owned());
                }
            }
            Flag::Depth => parse_bit_depth(options, &text, diag),
            Flag::Help => return Ok(Some(EarlyExit::Help)),
            Flag::Slice => parse_slice(options, &text, diag),
            Flag::MirrorTiles => {
                options.allow_mirroring = true;
                options.allow_dedup = true;
            }
            Flag::NbTiles => parse_nb_tiles(options, &text, diag),
            Flag::NbPalettes => parse_nb_palettes(options, &text, diag),
            Flag::GroupOutputs => deferred.group_outputs = true,
            Flag::Output => set_path(&mut options.output, path(), "tile data", diag),
            Flag::AutoPalette => deferred.auto_palettes = true,
            Flag::Palette => {
                deferred.auto_palettes = false;
                set_path(&mut options.palettes, path(), "palettes", diag);
            }
            Flag::AutoPaletteMap => deferred.auto_palmap = true,
            Flag::PaletteMap => {
                deferred.auto_palmap = false;
                set_path(&mut options.palmap, path(), "palette map", diag);
            }
            Flag::Reverse => parse_reverse(options, &text, diag),
            Flag::PaletteSize => parse_palette_size(options, &text, diag),
            Flag::AutoTilemap => deferred.auto_tilemap = true,
            Flag::Tilemap => {
                deferred.auto_tilemap = false;
                set_path(&mut options.tilemap, path(), "tilemap", diag);
            }
            Flag::UniqueTiles => options.allow_dedup = true,
            Flag::Version => return Ok(Some(EarlyExit::Version)),
            Flag::Verbose => {
                if options.verbosity < VERB_MAX {
                    options.verbosity += 1;
                }
            }
            Flag::TrimEnd => parse_trim(options, &text, diag),
            Flag::Columns => options.column_major = true,
        }

        Ok(None)
    }
}

fn set_path(slot: &mut Option<PathBuf>, path: PathBuf, what: &str, diag: &mut Diagnostics) {
    if let Some(previous) = slot {
        diag.warning(format!("Overriding {} file {}", what, previous.display()));
    }
    *slot = Some(path);
}

fn parse_bit_depth(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let mut cursor = arg;
    let depth = parse_number(&mut cursor, "Bit depth", 2, diag);
    if !cursor.is_empty() {
        diag.error(format!("Bit depth (-d) argument must be a valid number, not \"{}\"", arg));
    }
    match depth {
        1 | 2 => options.bit_depth = depth as u8,
        _ => {
            diag.error(format!("Bit depth must be 1 or 2, not {}", depth));
            options.bit_depth = 2;
        }
    }
}

fn parse_nb_palettes(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let mut cursor = arg;
    let count = parse_number(&mut cursor, "Number of palettes", 256, diag);
    if !cursor.is_empty() {
        diag.error(format!("Number of palettes (-n) must be a valid number, not \"{}\"", arg));
    }
    if count > 256 {
        diag.error("Number of palettes (-n) must not exceed 256!");
    } else if count == 0 {
        diag.error("Number of palettes (-n) may not be 0!");
    }
    options.nb_palettes = count;
}

fn parse_palette_size(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let mut cursor = arg;
    let size = parse_number(&mut cursor, "Number of colors per palette", 4, diag);
    if !cursor.is_empty() {
        diag.error(format!("Palette size (-s) must be a valid number, not \"{}\"", arg));
    }
    if size > 4 {
        diag.error("Palette size (-s) must not exceed 4!");
    } else if size == 0 {
        diag.error("Palette size (-s) may not be 0!");
    }
    options.nb_colors_per_pal = size.min(4) as u8;
}

fn parse_trim(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let mut cursor = arg;
    options.trim = u64::from(parse_number(&mut cursor, "Number of tiles to trim", 0, diag));
    if !cursor.is_empty() {
        diag.error(format!("Tile trim (-x) argument must be a valid number, not \"{}\"", arg));
    }
}

fn parse_reverse(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let mut cursor = arg;
    options.reversed_width = parse_number(&mut cursor, "Reversed image stride", u16::MAX, diag);
    if !cursor.is_empty() {
        diag.error(format!("Reversed image stride (-r) must be a valid number, not \"{}\"", arg));
    }
    if options.reversed_width == 0 {
        diag.error("Reversed image stride (-r) may not be 0!");
    }
}

/// Parse `bank0[,bank1]`; a missing second value is 0.
fn parse_bank_pair(
    arg: &str,
    labels: [&str; 2],
    err_val: u16,
    what: &str,
    diag: &mut Diagnostics,
) -> [u16; 2] {
    let mut cursor = arg;
    let first = parse_number(&mut cursor, labels[0], err_val, diag);
    if cursor.is_empty() {
        return [first, 0];
    }

    skip_whitespace(&mut cursor);
    if !eat_separator(&mut cursor, ',') {
        diag.error(format!("{} must be one or two comma-separated numbers, not \"{}\"", what, arg));
        return [first, 0];
    }
    skip_whitespace(&mut cursor);
    let second = parse_number(&mut cursor, labels[1], err_val, diag);
    if !cursor.is_empty() {
        diag.error(format!("{} must be one or two comma-separated numbers, not \"{}\"", what, arg));
    }
    [first, second]
}

fn parse_base_tiles(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let ids = parse_bank_pair(
        arg,
        ["Bank 0 base tile ID", "Bank 1 base tile ID"],
        0,
        "Base tile IDs",
        diag,
    );
    for (bank, (&id, slot)) in ids.iter().zip(&mut options.base_tile_ids).enumerate() {
        *slot = u8::try_from(id).unwrap_or_else(|_| {
            diag.error(format!("Bank {} base tile ID must be below 256", bank));
            0
        });
    }
}

fn parse_nb_tiles(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let caps = parse_bank_pair(
        arg,
        ["Number of tiles in bank 0", "Number of tiles in bank 1"],
        256,
        "Bank capacity",
        diag,
    );
    for (bank, &cap) in caps.iter().enumerate() {
        if cap > 256 {
            diag.error(format!("Bank {} cannot contain more than 256 tiles", bank));
        }
    }
    options.max_nb_tiles = caps;
}

/// Largest slice offset; offsets must fit in a signed 16-bit value.
const MAX_SLICE_OFFSET: u16 = i16::MAX as u16;

/// Parse `left,top:width,height`.
fn parse_slice(options: &mut Options, arg: &str, diag: &mut Diagnostics) {
    let slice = &mut options.input_slice;
    let mut cursor = arg;

    slice.left = parse_number(&mut cursor, "Input slice left coordinate", u16::MAX, diag);
    if slice.left > MAX_SLICE_OFFSET {
        diag.error("Input slice left coordinate is out of range!");
        return;
    }
    skip_whitespace(&mut cursor);
    if !eat_separator(&mut cursor, ',') {
        diag.error(format!("Missing comma after left coordinate in \"{}\"", arg));
        return;
    }

    skip_whitespace(&mut cursor);
    slice.top = parse_number(&mut cursor, "Input slice upper coordinate", u16::MAX, diag);
    if slice.top > MAX_SLICE_OFFSET {
        diag.error("Input slice upper coordinate is out of range!");
        return;
    }
    skip_whitespace(&mut cursor);
    if !eat_separator(&mut cursor, ':') {
        diag.error(format!("Missing colon after upper coordinate in \"{}\"", arg));
        return;
    }

    skip_whitespace(&mut cursor);
    slice.width = parse_number(&mut cursor, "Input slice width", u16::MAX, diag);
    skip_whitespace(&mut cursor);
    if slice.width == 0 {
        diag.error("Input slice width may not be 0!");
    }
    if !eat_separator(&mut cursor, ',') {
        diag.error(format!("Missing comma after width in \"{}\"", arg));
        return;
    }

    skip_whitespace(&mut cursor);
    slice.height = parse_number(&mut cursor, "Input slice height", u16::MAX, diag);
    if slice.height == 0 {
        diag.error("Input slice height may not be 0!");
    }
    if !cursor.is_empty() {
        diag.error(format!("Unexpected extra characters after slice spec in \"{}\"", arg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSlice;
    use crate::diagnostics::Severity;

    fn scan_all(args: &[&str]) -> (OptionsBuilder, Diagnostics) {
        let mut diag = Diagnostics::new();
        let mut frame = Frame::command_line(std::iter::once("tilegfx").chain(args.iter().copied()));
        let mut resolver = OptionResolver::new();
        let scan = resolver.scan(&mut frame, &mut diag).unwrap();
        assert_eq!(scan, Scan::Exhausted);
        (resolver.into_builder(), diag)
    }

    fn scan_err(args: &[&str]) -> FatalError {
        let mut diag = Diagnostics::new();
        let mut frame = Frame::command_line(std::iter::once("tilegfx").chain(args.iter().copied()));
        OptionResolver::new().scan(&mut frame, &mut diag).unwrap_err()
    }

    fn messages(diag: &Diagnostics) -> Vec<String> {
        diag.entries().iter().map(|d| d.message.clone()).collect()
    }

    #[test]
    fn test_option_table_is_consistent() {
        for (i, spec) in OPTIONS.iter().enumerate() {
            for other in &OPTIONS[i + 1..] {
                assert_ne!(spec.long, other.long);
                if spec.short.is_some() {
                    assert_ne!(spec.short, other.short, "duplicate short option");
                }
            }
            if let Some(replacement) = spec.replaced_by {
                let target = lookup_long(replacement).unwrap();
                assert_eq!(target.flag, spec.flag);
                assert!(target.replaced_by.is_none());
            }
        }
    }

    #[test]
    fn test_boolean_toggles() {
        let (builder, diag) = scan_all(&["-C", "-Z", "-u"]);
        assert!(builder.options.use_color_curve);
        assert!(builder.options.column_major);
        assert!(builder.options.allow_dedup);
        assert!(!builder.options.allow_mirroring);
        assert!(diag.entries().is_empty());
    }

    #[test]
    fn test_mirror_implies_dedup() {
        let (builder, _) = scan_all(&["--mirror-tiles"]);
        assert!(builder.options.allow_mirroring);
        assert!(builder.options.allow_dedup);
    }

    #[test]
    fn test_short_cluster_with_attached_value() {
        let (builder, diag) = scan_all(&["-mZd1", "img.png"]);
        assert!(builder.options.allow_mirroring);
        assert!(builder.options.column_major);
        assert_eq!(builder.options.bit_depth, 1);
        assert_eq!(builder.options.input, Some(PathBuf::from("img.png")));
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_long_value_forms() {
        let (builder, _) = scan_all(&["--output=a.2bpp", "--tilemap", "a.tilemap"]);
        assert_eq!(builder.options.output, Some(PathBuf::from("a.2bpp")));
        assert_eq!(builder.options.tilemap, Some(PathBuf::from("a.tilemap")));
    }

    #[test]
    fn test_long_prefix() {
        let (builder, _) = scan_all(&["--mirror", "--nb-p", "4"]);
        assert!(builder.options.allow_mirroring);
        assert_eq!(builder.options.nb_palettes, 4);

        assert!(matches!(scan_err(&["--output-p"]), FatalError::AmbiguousOption(_)));
    }

    #[test]
    fn test_single_dash_long_options() {
        let (builder, diag) = scan_all(&["-depth", "1", "-mirror-tiles", "in.png"]);
        assert_eq!(builder.options.bit_depth, 1);
        assert!(builder.options.allow_mirroring);
        assert!(builder.options.allow_dedup);
        assert_eq!(builder.options.input, Some(PathBuf::from("in.png")));
        assert!(diag.entries().is_empty());

        let (builder, _) = scan_all(&["-output=a.2bpp", "-nb-p", "4", "-colu"]);
        assert_eq!(builder.options.output, Some(PathBuf::from("a.2bpp")));
        assert_eq!(builder.options.nb_palettes, 4);
        assert!(builder.options.column_major);
    }

    #[test]
    fn test_single_dash_deprecated_alias_warns() {
        let (builder, diag) = scan_all(&["-output-tilemap"]);
        assert!(builder.deferred.auto_tilemap);
        assert_eq!(
            messages(&diag),
            vec!["`--output-tilemap` is deprecated, use `--auto-tilemap` instead"]
        );
    }

    #[test]
    fn test_single_dash_falls_back_to_short_options() {
        // No long name starts with "mu", and "d" alone is a short option
        let (builder, _) = scan_all(&["-mu", "-d", "1"]);
        assert!(builder.options.allow_mirroring);
        assert!(builder.options.allow_dedup);
        assert_eq!(builder.options.bit_depth, 1);

        // No long name starts with "outfile.2bpp"
        let (builder, _) = scan_all(&["-outfile.2bpp"]);
        assert_eq!(builder.options.output, Some(PathBuf::from("utfile.2bpp")));

        assert!(matches!(scan_err(&["-columns=yes"]), FatalError::UnexpectedArgument(_)));
    }

    #[test]
    fn test_unknown_and_malformed_options() {
        assert!(matches!(scan_err(&["-k"]), FatalError::UnknownOption(s) if s == "-k"));
        assert!(matches!(scan_err(&["--bogus"]), FatalError::UnknownOption(s) if s == "--bogus"));
        assert!(matches!(scan_err(&["-o"]), FatalError::MissingArgument(s) if s == "-o"));
        assert!(matches!(scan_err(&["--depth"]), FatalError::MissingArgument(_)));
        assert!(matches!(scan_err(&["--columns=yes"]), FatalError::UnexpectedArgument(_)));
    }

    #[test]
    fn test_deprecated_alias_warns() {
        let (builder, diag) = scan_all(&["--output-tilemap"]);
        assert!(builder.deferred.auto_tilemap);
        assert_eq!(diag.count(Severity::Warning), 1);
        assert!(!diag.has_errors());
        assert_eq!(
            diag.entries()[0].message,
            "`--output-tilemap` is deprecated, use `--auto-tilemap` instead"
        );
    }

    #[test]
    fn test_path_override_warns_once() {
        let (builder, diag) = scan_all(&["-o", "first.2bpp", "-o", "second.2bpp"]);
        assert_eq!(builder.options.output, Some(PathBuf::from("second.2bpp")));
        assert_eq!(diag.count(Severity::Warning), 1);
        assert_eq!(messages(&diag), vec!["Overriding tile data file first.2bpp"]);
    }

    #[test]
    fn test_explicit_path_clears_auto() {
        let (builder, _) = scan_all(&["-T", "-t", "map.bin"]);
        assert!(!builder.deferred.auto_tilemap);
        assert_eq!(builder.options.tilemap, Some(PathBuf::from("map.bin")));

        let (builder, diag) = scan_all(&["-t", "map.bin", "-T"]);
        assert!(builder.deferred.auto_tilemap);
        assert_eq!(builder.options.tilemap, Some(PathBuf::from("map.bin")));
        assert!(diag.entries().is_empty());
    }

    #[test]
    fn test_bit_depth() {
        let (builder, diag) = scan_all(&["-d", "3"]);
        assert_eq!(builder.options.bit_depth, 2);
        assert_eq!(messages(&diag), vec!["Bit depth must be 1 or 2, not 3"]);

        let (builder, diag) = scan_all(&["-d", "1x"]);
        assert_eq!(builder.options.bit_depth, 1);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_nb_palettes_range() {
        let (builder, diag) = scan_all(&["-n", "0"]);
        assert_eq!(builder.options.nb_palettes, 0);
        assert_eq!(messages(&diag), vec!["Number of palettes (-n) may not be 0!"]);

        let (_, diag) = scan_all(&["-n", "257"]);
        assert_eq!(diag.error_count(), 1);

        let (builder, diag) = scan_all(&["-n", "$100"]);
        assert_eq!(builder.options.nb_palettes, 256);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_palette_size() {
        let (builder, diag) = scan_all(&["-s", "3"]);
        assert_eq!(builder.options.nb_colors_per_pal, 3);
        assert!(!diag.has_errors());

        let (builder, diag) = scan_all(&["--palette-size", "5"]);
        assert_eq!(builder.options.nb_colors_per_pal, 4);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_trim_and_reverse() {
        let (builder, diag) = scan_all(&["-x", "%11", "-r", "20"]);
        assert_eq!(builder.options.trim, 3);
        assert_eq!(builder.options.reversed_width, 20);
        assert!(!diag.has_errors());

        let (_, diag) = scan_all(&["-r", "0"]);
        assert_eq!(messages(&diag), vec!["Reversed image stride (-r) may not be 0!"]);
    }

    #[test]
    fn test_base_tiles() {
        let (builder, diag) = scan_all(&["-b", "$80, 16"]);
        assert_eq!(builder.options.base_tile_ids, [0x80, 16]);
        assert!(!diag.has_errors());

        let (builder, _) = scan_all(&["-b", "5"]);
        assert_eq!(builder.options.base_tile_ids, [5, 0]);

        let (builder, diag) = scan_all(&["-b", "256,1"]);
        assert_eq!(builder.options.base_tile_ids, [0, 1]);
        assert_eq!(messages(&diag), vec!["Bank 0 base tile ID must be below 256"]);

        let (_, diag) = scan_all(&["-b", "1;2"]);
        assert_eq!(
            messages(&diag),
            vec!["Base tile IDs must be one or two comma-separated numbers, not \"1;2\""]
        );
    }

    #[test]
    fn test_nb_tiles() {
        let (builder, diag) = scan_all(&["-N", "256,128"]);
        assert_eq!(builder.options.max_nb_tiles, [256, 128]);
        assert!(!diag.has_errors());

        let (_, diag) = scan_all(&["-N", "300"]);
        assert_eq!(messages(&diag), vec!["Bank 0 cannot contain more than 256 tiles"]);

        let (_, diag) = scan_all(&["-N", "1,2,3"]);
        assert_eq!(diag.error_count(), 1);
    }

    #[test]
    fn test_slice() {
        let (builder, diag) = scan_all(&["-L", "5,10:20,30"]);
        assert_eq!(
            builder.options.input_slice,
            InputSlice { left: 5, top: 10, width: 20, height: 30 }
        );
        assert!(diag.entries().is_empty());

        let (builder, _) = scan_all(&["--slice", "0x10 , 2 : 3 , 4"]);
        assert_eq!(
            builder.options.input_slice,
            InputSlice { left: 16, top: 2, width: 3, height: 4 }
        );
    }

    #[test]
    fn test_slice_wrong_separator() {
        let (_, diag) = scan_all(&["-L", "5:10,20,30"]);
        assert_eq!(messages(&diag), vec!["Missing comma after left coordinate in \"5:10,20,30\""]);
    }

    #[test]
    fn test_slice_zero_size_and_trailing() {
        let (_, diag) = scan_all(&["-L", "0,0:0,0z"]);
        assert_eq!(
            messages(&diag),
            vec![
                "Input slice width may not be 0!",
                "Input slice height may not be 0!",
                "Unexpected extra characters after slice spec in \"0,0:0,0z\"",
            ]
        );
    }

    #[test]
    fn test_slice_offset_range() {
        let (_, diag) = scan_all(&["-L", "40000,0:1,1"]);
        assert_eq!(messages(&diag), vec!["Input slice left coordinate is out of range!"]);
    }

    #[test]
    fn test_colors_modes() {
        let (builder, diag) = scan_all(&["-c", "#fff,#000"]);
        assert_eq!(builder.options.pal_spec_kind, PalSpecKind::Explicit);
        assert_eq!(builder.options.pal_spec.len(), 1);
        assert!(builder.deferred.external_pal_spec.is_none());
        assert!(!diag.has_errors());

        let (builder, _) = scan_all(&["-c", "EMBEDDED"]);
        assert_eq!(builder.options.pal_spec_kind, PalSpecKind::Embedded);

        let (builder, _) = scan_all(&["-c", "#fff", "-c", "hex:pals.txt"]);
        assert_eq!(builder.options.pal_spec_kind, PalSpecKind::Explicit);
        assert_eq!(builder.deferred.external_pal_spec.as_deref(), Some("hex:pals.txt"));
    }

    #[test]
    fn test_verbosity_is_bounded() {
        let (builder, _) = scan_all(&["-vvvvvvvvvv"]);
        assert_eq!(builder.options.verbosity, VERB_MAX);
    }

    #[test]
    fn test_version_and_help_stop_scanning() {
        let mut diag = Diagnostics::new();
        let mut frame = Frame::command_line(["tilegfx", "-V", "-k"]);
        let scan = OptionResolver::new().scan(&mut frame, &mut diag).unwrap();
        assert_eq!(scan, Scan::Exit(EarlyExit::Version));

        let mut frame = Frame::command_line(["tilegfx", "--help"]);
        let scan = OptionResolver::new().scan(&mut frame, &mut diag).unwrap();
        assert_eq!(scan, Scan::Exit(EarlyExit::Help));
    }

    #[test]
    fn test_at_file_request() {
        let mut diag = Diagnostics::new();
        let mut frame = Frame::command_line(["tilegfx", "-u", "@opts.txt", "-m"]);
        let mut resolver = OptionResolver::new();
        let scan = resolver.scan(&mut frame, &mut diag).unwrap();
        assert_eq!(scan, Scan::ResponseFile(PathBuf::from("opts.txt")));
        assert!(resolver.builder().options.allow_dedup);
        assert!(!resolver.builder().options.allow_mirroring);

        // Scanning resumes after the `@` argument
        assert_eq!(resolver.scan(&mut frame, &mut diag).unwrap(), Scan::Exhausted);
        assert!(resolver.builder().options.allow_mirroring);
    }

    #[test]
    fn test_duplicate_and_empty_input() {
        assert!(matches!(
            scan_err(&["a.png", "b.png"]),
            FatalError::DuplicateInput { first, second }
                if first == PathBuf::from("a.png") && second == PathBuf::from("b.png")
        ));
        assert!(matches!(scan_err(&[""]), FatalError::EmptyInput));
    }

    #[test]
    fn test_escape_leaves_rest_for_registration() {
        let mut diag = Diagnostics::new();
        let mut frame = Frame::command_line(["tilegfx", "-u", "--", "-weird.png"]);
        let mut resolver = OptionResolver::new();
        assert_eq!(resolver.scan(&mut frame, &mut diag).unwrap(), Scan::Escaped);
        resolver.register_remaining(&mut frame, &mut diag).unwrap();
        assert_eq!(resolver.builder().options.input, Some(PathBuf::from("-weird.png")));
    }

    #[test]
    fn test_diagnostics_carry_origin() {
        let (_, diag) = scan_all(&["-u", "-d", "9"]);
        let origin = diag.entries()[0].origin.as_ref().unwrap();
        assert_eq!(origin.file, None);
        assert_eq!(origin.index, 1);
    }
}
