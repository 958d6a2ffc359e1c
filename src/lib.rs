//! tilegfx - argument resolution for an image-to-tile converter
//!
//! This library turns a command line into a validated conversion
//! configuration:
//! - Expand `@file` response files, nested and in order
//! - Resolve getopt-style short and long options with base-prefixed numbers
//! - Record recoverable errors and warnings, stopping only on fatal ones
//! - Derive automatic output paths and parse explicit palette specs
//!
//! The resolved [`config::Options`] are handed to a [`pipeline::Pipeline`].

pub mod args;
pub mod cli;
pub mod color;
pub mod config;
pub mod diagnostics;
pub mod number;
pub mod options;
pub mod output;
pub mod palette;
pub mod palette_spec;
pub mod pipeline;
pub mod response_file;
