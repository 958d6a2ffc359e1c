//! Argument sources and the top-level resolution loop
//!
//! Arguments come from a stack of frames: the command line at the bottom,
//! and one frame per response file being expanded on top of it. A `@path`
//! argument pushes a new frame; when a frame runs out, scanning resumes in
//! the frame below, right after the `@path` argument that opened it. The
//! options therefore apply in the same order as if each response file's
//! contents had been spliced into the command line.

use crate::config::Options;
use crate::diagnostics::{Diagnostics, FatalError};
use crate::options::{EarlyExit, OptionResolver, Scan};
use crate::response_file::read_response_file;
use clap_lex::{ArgCursor, RawArgs};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Deepest supported response file nesting.
pub const MAX_NESTING: usize = 64;

/// One source of arguments with its own read position.
#[derive(Debug)]
pub struct Frame {
    pub(crate) args: RawArgs,
    pub(crate) cursor: ArgCursor,
    /// Response file this frame was read from
    pub(crate) file: Option<PathBuf>,
    pub(crate) canonical: Option<PathBuf>,
    /// Arguments consumed so far, for diagnostic origins
    pub(crate) consumed: usize,
}

impl Frame {
    /// Frame over the process arguments; the first one is the program name.
    pub fn command_line<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = RawArgs::new(args);
        let mut cursor = args.cursor();
        let _program = args.next_os(&mut cursor);
        Self { args, cursor, file: None, canonical: None, consumed: 0 }
    }

    fn response_file(path: &Path, canonical: PathBuf, tokens: Vec<OsString>) -> Self {
        let args = RawArgs::new(tokens);
        let cursor = args.cursor();
        Self {
            args,
            cursor,
            file: Some(path.to_path_buf()),
            canonical: Some(canonical),
            consumed: 0,
        }
    }

    /// Response file this frame reads from, `None` for the command line.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

/// The command line plus the response files currently being expanded.
#[derive(Debug)]
pub struct ArgumentStack {
    root: Frame,
    nested: Vec<Frame>,
}

impl ArgumentStack {
    pub fn new(root: Frame) -> Self {
        Self { root, nested: Vec::new() }
    }

    /// The frame arguments are currently read from.
    pub fn current(&mut self) -> &mut Frame {
        self.nested.last_mut().unwrap_or(&mut self.root)
    }

    /// Number of response files being expanded.
    pub fn depth(&self) -> usize {
        self.nested.len()
    }

    /// Read `path` and make it the current frame.
    ///
    /// A file that is already being expanded further down the stack would
    /// never terminate and is rejected; including the same file again once
    /// it is finished is fine.
    pub fn push_response_file(&mut self, path: &Path) -> Result<(), FatalError> {
        let read_error = |source| FatalError::ResponseFile { path: path.to_path_buf(), source };

        let canonical = fs::canonicalize(path).map_err(read_error)?;
        if self.nested.iter().any(|frame| frame.canonical.as_ref() == Some(&canonical)) {
            return Err(FatalError::ResponseFileCycle(path.to_path_buf()));
        }
        if self.nested.len() >= MAX_NESTING {
            return Err(FatalError::NestingTooDeep { path: path.to_path_buf(), limit: MAX_NESTING });
        }

        let tokens = read_response_file(path).map_err(read_error)?;
        tracing::debug!(
            path = %path.display(),
            depth = self.nested.len() + 1,
            tokens = tokens.len(),
            "expanding response file"
        );
        self.nested.push(Frame::response_file(path, canonical, tokens));
        Ok(())
    }

    /// Drop the current response file frame.
    ///
    /// Returns `false` once only the command line is left.
    pub fn pop(&mut self) -> bool {
        match self.nested.pop() {
            Some(frame) => {
                tracing::debug!(path = ?frame.file(), "finished response file");
                true
            }
            None => false,
        }
    }
}

/// What the process should do after resolving its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Run(Options),
    PrintVersion,
    PrintHelp,
}

/// Resolve process arguments (program name first) into an [`Invocation`].
///
/// Recoverable problems are recorded in `diag` and do not stop resolution;
/// the caller checks the error count before acting on the result.
pub fn resolve<I, T>(args: I, diag: &mut Diagnostics) -> Result<Invocation, FatalError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut stack = ArgumentStack::new(Frame::command_line(args));
    let mut resolver = OptionResolver::new();

    loop {
        match resolver.scan(stack.current(), diag)? {
            Scan::ResponseFile(path) => stack.push_response_file(&path)?,
            Scan::Exit(EarlyExit::Version) => return Ok(Invocation::PrintVersion),
            Scan::Exit(EarlyExit::Help) => return Ok(Invocation::PrintHelp),
            Scan::Escaped => {
                resolver.register_remaining(stack.current(), diag)?;
                if !stack.pop() {
                    break;
                }
            }
            Scan::Exhausted => {
                if !stack.pop() {
                    break;
                }
            }
        }
    }

    let options = resolver.into_builder().finalize(diag)?;
    Ok(Invocation::Run(options))
}
