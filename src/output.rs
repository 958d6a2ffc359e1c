//! Human-readable output: usage text and the verbose configuration report

use crate::color::to_css;
use crate::config::{Options, PalSpecKind};
use std::fmt;
use std::path::Path;

/// Usage summary printed by `--help` and after usage errors.
pub const USAGE: &str = "\
Usage: tilegfx [-r stride] [-CmOuVZ] [-v [-v ...]] [-a <attr_map> | -A]
       [-b <base_ids>] [-c <colors>] [-d <depth>] [-L <slice>] [-N <nb_tiles>]
       [-n <nb_pals>] [-o <out_file>] [-p <pal_file> | -P] [-q <pal_map> | -Q]
       [-s <nb_colors>] [-t <tile_map> | -T] [-x <nb_tiles>] <file>
Useful options:
    -m, --mirror-tiles    optimize out mirrored tiles
    -o, --output <path>   output the tile data to this path
    -t, --tilemap <path>  output the tile map to this path
    -u, --unique-tiles    optimize out identical tiles
    -V, --version         print the version and exit
    -h, --help            print this help and exit

Arguments of the form @<path> are read from that file, one or more per line.
";

/// Version line printed by `--version` and at the top of the report.
pub fn version_line() -> String {
    format!("tilegfx {}", env!("CARGO_PKG_VERSION"))
}

/// The resolved configuration, as printed at verbosity 1 and above.
pub struct ConfigReport<'a>(pub &'a Options);

impl fmt::Display for ConfigReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.0;
        writeln!(f, "{}", version_line())?;
        writeln!(f, "Options:")?;
        if options.column_major {
            writeln!(f, "\tVisit image in column-major order")?;
        }
        if options.allow_mirroring {
            writeln!(f, "\tAllow mirroring tiles")?;
        }
        if options.allow_dedup {
            writeln!(f, "\tAllow deduplicating tiles")?;
        }
        if options.use_color_curve {
            writeln!(f, "\tUse color curve")?;
        }
        writeln!(f, "\tBit depth: {}bpp", options.bit_depth)?;
        if options.trim != 0 {
            writeln!(f, "\tTrim the last {} tiles", options.trim)?;
        }
        writeln!(f, "\tMaximum {} palettes", options.nb_palettes)?;
        writeln!(f, "\tPalettes contain {} colors", options.nb_colors_per_pal)?;

        let kind = match options.pal_spec_kind {
            PalSpecKind::None => "No",
            PalSpecKind::Explicit => "Explicit",
            PalSpecKind::Embedded => "Embedded",
        };
        writeln!(f, "\t{} palette spec", kind)?;
        if options.pal_spec_kind == PalSpecKind::Explicit {
            writeln!(f, "\t[")?;
            for palette in &options.pal_spec {
                let colors: Vec<String> = palette
                    .iter()
                    .map(|color| color.map_or_else(|| "none".to_string(), to_css))
                    .collect();
                writeln!(f, "\t\t{},", colors.join(", "))?;
            }
            writeln!(f, "\t]")?;
        }

        let slice = &options.input_slice;
        writeln!(
            f,
            "\tInput image slice: {}x{} pixels starting at ({}, {})",
            slice.width, slice.height, slice.left, slice.top
        )?;
        writeln!(
            f,
            "\tBase tile IDs: [{}, {}]",
            options.base_tile_ids[0], options.base_tile_ids[1]
        )?;
        writeln!(
            f,
            "\tMaximum {} tiles in bank 0, {} in bank 1",
            options.max_nb_tiles[0], options.max_nb_tiles[1]
        )?;

        let paths: [(&str, Option<&Path>); 6] = [
            ("Input image", options.input.as_deref()),
            ("Output tile data", options.output.as_deref()),
            ("Output tilemap", options.tilemap.as_deref()),
            ("Output attrmap", options.attrmap.as_deref()),
            ("Output palettes", options.palettes.as_deref()),
            ("Output palette map", options.palmap.as_deref()),
        ];
        for (name, path) in paths {
            if let Some(path) = path {
                writeln!(f, "\t{}: {}", name, path.display())?;
            }
        }
        writeln!(f, "Ready.")
    }
}
