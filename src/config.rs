//! Conversion configuration
//!
//! Options are resolved in two phases. While arguments are scanned, an
//! [`OptionsBuilder`] accumulates raw values plus [`DeferredFlags`] for the
//! decisions that need every argument first. [`OptionsBuilder::finalize`] then
//! derives implied values and automatic paths, runs the deferred palette-file
//! parse and yields the immutable [`Options`] handed to the conversion
//! pipeline.

use crate::color::{cgb_color, to_css};
use crate::diagnostics::{Diagnostics, FatalError};
use crate::palette::PaletteSlots;
use crate::palette_spec::parse_external_pal_spec;
use image::Rgba;
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Verbosity at which the configuration report is printed.
pub const VERB_CFG: u8 = 1;
/// Highest verbosity level; further `-v` flags are ignored.
pub const VERB_MAX: u8 = 6;

/// One palette of an explicit palette spec; unset slots are `None`.
pub type SpecPalette = [Option<Rgba<u8>>; 4];

/// Where palettes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PalSpecKind {
    /// Palettes are generated from the image
    #[default]
    None,
    /// Palettes are given inline or by a palette file
    Explicit,
    /// Palettes come from the image's own PLTE chunk
    Embedded,
}

/// Rectangle of the input image to convert. Zero width means "whole image".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InputSlice {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
}

/// Fully resolved conversion options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub tilemap: Option<PathBuf>,
    pub attrmap: Option<PathBuf>,
    pub palettes: Option<PathBuf>,
    pub palmap: Option<PathBuf>,

    pub bit_depth: u8,
    pub nb_colors_per_pal: u8,
    pub nb_palettes: u16,
    pub base_tile_ids: [u8; 2],
    pub max_nb_tiles: [u16; 2],
    pub input_slice: InputSlice,
    pub trim: u64,
    /// Row stride of the reversed image in tiles, 0 when not reversing
    pub reversed_width: u16,

    pub allow_mirroring: bool,
    pub allow_dedup: bool,
    pub use_color_curve: bool,
    pub column_major: bool,

    pub pal_spec_kind: PalSpecKind,
    #[serde(serialize_with = "serialize_pal_spec")]
    pub pal_spec: Vec<SpecPalette>,

    pub verbosity: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            tilemap: None,
            attrmap: None,
            palettes: None,
            palmap: None,
            bit_depth: 2,
            nb_colors_per_pal: 0,
            nb_palettes: 8,
            base_tile_ids: [0, 0],
            max_nb_tiles: [u16::MAX, 0],
            input_slice: InputSlice::default(),
            trim: 0,
            reversed_width: 0,
            allow_mirroring: false,
            allow_dedup: false,
            use_color_curve: false,
            column_major: false,
            pal_spec_kind: PalSpecKind::None,
            pal_spec: Vec::new(),
            verbosity: 0,
        }
    }
}

impl Options {
    /// Whether tile data is turned back into an image.
    pub fn is_reverse(&self) -> bool {
        self.reversed_width != 0
    }

    /// The explicit palette spec as hardware palette rows.
    pub fn palette_rows(&self, reserve_transparency: bool) -> Vec<PaletteSlots> {
        self.pal_spec
            .iter()
            .map(|palette| {
                let mut row = PaletteSlots::new(reserve_transparency);
                for color in palette.iter().flatten() {
                    if row.is_full() {
                        break;
                    }
                    row.add_color(cgb_color(*color));
                }
                row
            })
            .collect()
    }
}

fn serialize_pal_spec<S: Serializer>(spec: &[SpecPalette], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(spec.len()))?;
    for palette in spec {
        let colors: Vec<Option<String>> =
            palette.iter().map(|color| color.map(to_css)).collect();
        seq.serialize_element(&colors)?;
    }
    seq.end()
}

/// Decisions postponed until every argument has been seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredFlags {
    pub auto_attrmap: bool,
    pub auto_tilemap: bool,
    pub auto_palettes: bool,
    pub auto_palmap: bool,
    /// Derive automatic paths from the output path instead of the input path
    pub group_outputs: bool,
    /// Palette file to parse once the palette size is known
    pub external_pal_spec: Option<String>,
}

/// Options under construction, plus the decisions deferred to finalization.
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    pub options: Options,
    pub deferred: DeferredFlags,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve deferred decisions and produce the final options.
    ///
    /// Recoverable problems are recorded in `diag`; a missing source path for
    /// an automatic output is fatal.
    pub fn finalize(self, diag: &mut Diagnostics) -> Result<Options, FatalError> {
        let OptionsBuilder { mut options, deferred } = self;
        diag.set_origin(None);

        let max_colors = 1u16 << options.bit_depth.min(8);
        if options.nb_colors_per_pal == 0 {
            options.nb_colors_per_pal = u8::try_from(max_colors).unwrap_or(u8::MAX);
        } else if u16::from(options.nb_colors_per_pal) > max_colors {
            diag.error(format!(
                "{}bpp palettes can only contain {} colors, not {}",
                options.bit_depth, max_colors, options.nb_colors_per_pal
            ));
        }

        let (source, source_name) = if deferred.group_outputs {
            (options.output.clone(), "output tile data file")
        } else {
            (options.input.clone(), "input image")
        };
        let source = source.as_deref();
        auto_out_path(deferred.auto_attrmap, &mut options.attrmap, source, source_name, "attrmap")?;
        auto_out_path(deferred.auto_tilemap, &mut options.tilemap, source, source_name, "tilemap")?;
        auto_out_path(deferred.auto_palettes, &mut options.palettes, source, source_name, "pal")?;
        auto_out_path(deferred.auto_palmap, &mut options.palmap, source, source_name, "palmap")?;

        if let Some(spec) = &deferred.external_pal_spec {
            options.pal_spec = parse_external_pal_spec(spec, options.nb_colors_per_pal, diag);
        }

        Ok(options)
    }
}

/// Fill in an automatic output path by swapping the source's extension.
///
/// An explicitly given path always takes precedence over the automatic one.
fn auto_out_path(
    pending: bool,
    path: &mut Option<PathBuf>,
    source: Option<&Path>,
    source_name: &'static str,
    extension: &str,
) -> Result<(), FatalError> {
    if !pending || path.is_some() {
        return Ok(());
    }
    let source = source.ok_or(FatalError::MissingAutoSource(source_name))?;
    let derived = source.with_extension(extension);
    tracing::debug!(path = %derived.display(), "derived automatic output path");
    *path = Some(derived);
    Ok(())
}
