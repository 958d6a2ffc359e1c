//! Structured diagnostics for argument resolution
//!
//! Problems found while resolving arguments come in three strengths:
//! - **Fatal**: resolution stops; surfaced as a [`FatalError`] in a `Result`
//! - **Error**: recorded in [`Diagnostics`], counted, parsing keeps going
//! - **Warning**: recorded in [`Diagnostics`], never counted
//!
//! The sink never prints anything itself; the driver decides how to render
//! entries and when a nonzero error count aborts the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Severity of a recorded (non-fatal) diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational only, does not affect the exit status
    Warning,
    /// Marks the run as failing, but scanning continues
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where the argument that triggered a diagnostic came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// Response file the argument was read from, `None` for the command line
    pub file: Option<PathBuf>,
    /// 0-based position of the argument within its frame
    pub index: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "@{} argument {}", path.display(), self.index + 1),
            None => write!(f, "argument {}", self.index + 1),
        }
    }
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub origin: Option<Origin>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(origin) = &self.origin {
            write!(f, " ({})", origin)?;
        }
        Ok(())
    }
}

/// Collects diagnostics and keeps the saturating error counter.
///
/// The counter is kept separately from the entry list so that the driver can
/// [`drain`](Diagnostics::drain) entries as it prints them without losing
/// track of whether the run has failed.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    error_count: u64,
    origin: Option<Origin>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin stamped onto every diagnostic recorded from now on.
    pub fn set_origin(&mut self, origin: Option<Origin>) {
        self.origin = origin;
    }

    /// Record a non-fatal warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    /// Record a recoverable error and bump the error counter.
    pub fn error(&mut self, message: impl Into<String>) {
        self.error_count = self.error_count.saturating_add(1);
        self.push(Severity::Error, message.into());
    }

    fn push(&mut self, severity: Severity, message: String) {
        self.entries.push(Diagnostic { severity, message, origin: self.origin.clone() });
    }

    /// Number of recoverable errors recorded so far (saturating).
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count != 0
    }

    /// Entries not yet drained.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Take all pending entries, leaving the error counter untouched.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    /// Count pending entries of the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }
}

/// Conditions that stop argument resolution immediately.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FatalError {
    /// A second input image path was given
    #[error("input image specified more than once! (first \"{}\", then \"{}\")", .first.display(), .second.display())]
    DuplicateInput { first: PathBuf, second: PathBuf },
    /// An empty string was given as the input image path
    #[error("input image path cannot be empty")]
    EmptyInput,
    /// A response file could not be opened or read
    #[error("Error reading @{}: {source}", .path.display())]
    ResponseFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A response file (transitively) includes itself
    #[error("Recursive inclusion of response file @{}", .0.display())]
    ResponseFileCycle(PathBuf),
    /// Response files are nested deeper than the supported limit
    #[error("Response files nested more than {limit} levels deep (at @{})", .path.display())]
    NestingTooDeep { path: PathBuf, limit: usize },
    /// An option token matched nothing in the option table
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    /// A long option abbreviation matched several options
    #[error("option '--{0}' is ambiguous")]
    AmbiguousOption(String),
    /// A value-taking option was the last token of its frame
    #[error("option '{0}' requires an argument")]
    MissingArgument(String),
    /// A `--flag=value` was given for an option that takes no value
    #[error("option '--{0}' doesn't allow an argument")]
    UnexpectedArgument(String),
    /// Nothing to convert
    #[error("No input image specified")]
    NoInput,
    /// An auto-derived output path had nothing to be derived from
    #[error("No {0} specified")]
    MissingAutoSource(&'static str),
}

impl FatalError {
    /// Whether the usage text should accompany this error.
    pub fn shows_usage(&self) -> bool {
        !matches!(
            self,
            FatalError::ResponseFile { .. }
                | FatalError::ResponseFileCycle(_)
                | FatalError::NestingTooDeep { .. }
        )
    }
}
