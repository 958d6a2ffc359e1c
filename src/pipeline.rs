//! Hand-off from argument resolution to the conversion engine
//!
//! Resolution ends with an [`Options`] value and a [`Job`]. Whatever does the
//! actual image work implements [`Pipeline`]; the binary ships with
//! [`JsonReport`], which prints the resolved configuration instead.

use crate::config::{Options, PalSpecKind};
use crate::diagnostics::{Diagnostics, FatalError};
use crate::palette::PaletteSlots;
use serde::Serialize;
use std::io::{self, Write};

/// The kind of work a resolved configuration asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Job {
    /// Image to tile data
    Convert,
    /// Tile data back to an image
    Reverse,
    /// Only write the explicitly given palettes
    PalettesOnly,
}

/// Decide what to do with `options`.
///
/// Without an input image the only meaningful run is writing explicit
/// palettes to a palette file.
pub fn select_job(options: &Options) -> Result<Job, FatalError> {
    if options.input.is_some() {
        return Ok(if options.is_reverse() { Job::Reverse } else { Job::Convert });
    }
    if options.palettes.is_some()
        && options.pal_spec_kind == PalSpecKind::Explicit
        && !options.is_reverse()
    {
        return Ok(Job::PalettesOnly);
    }
    Err(FatalError::NoInput)
}

/// Consumer of a resolved configuration.
pub trait Pipeline {
    /// Carry out `job`. Recoverable problems go to `diag`.
    fn run(&mut self, options: &Options, job: Job, diag: &mut Diagnostics) -> io::Result<()>;
}

#[derive(Serialize)]
struct Report<'a> {
    job: Job,
    #[serde(flatten)]
    options: &'a Options,
    palette_rows: Vec<PaletteSlots>,
}

/// Pipeline that writes the configuration as pretty-printed JSON.
#[derive(Debug)]
pub struct JsonReport<W: Write> {
    writer: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Pipeline for JsonReport<W> {
    fn run(&mut self, options: &Options, job: Job, _diag: &mut Diagnostics) -> io::Result<()> {
        let report = Report { job, options, palette_rows: options.palette_rows(false) };
        serde_json::to_writer_pretty(&mut self.writer, &report)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::path::PathBuf;

    #[test]
    fn test_select_job() {
        let mut options = Options::default();
        assert!(matches!(select_job(&options), Err(FatalError::NoInput)));

        options.input = Some(PathBuf::from("in.png"));
        assert_eq!(select_job(&options).unwrap(), Job::Convert);

        options.reversed_width = 16;
        assert_eq!(select_job(&options).unwrap(), Job::Reverse);
    }

    #[test]
    fn test_palettes_only_needs_explicit_spec() {
        let mut options = Options::default();
        options.palettes = Some(PathBuf::from("out.pal"));
        assert!(select_job(&options).is_err());

        options.pal_spec_kind = PalSpecKind::Explicit;
        assert_eq!(select_job(&options).unwrap(), Job::PalettesOnly);

        options.reversed_width = 8;
        assert!(select_job(&options).is_err());
    }

    #[test]
    fn test_json_report() {
        let mut options = Options::default();
        options.input = Some(PathBuf::from("in.png"));
        options.pal_spec_kind = PalSpecKind::Explicit;
        options.pal_spec = vec![[Some(Rgba([255, 255, 255, 255])), None, None, None]];

        let mut report = JsonReport::new(Vec::new());
        let mut diag = Diagnostics::new();
        report.run(&options, Job::Convert, &mut diag).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&report.into_inner()).unwrap();
        assert_eq!(json["job"], "convert");
        assert_eq!(json["input"], "in.png");
        assert_eq!(json["bit_depth"], 2);
        assert_eq!(json["palette_rows"], serde_json::json!([["0x7fff"]]));
    }
}
