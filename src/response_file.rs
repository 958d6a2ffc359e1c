//! Response file ("at-file") tokenization
//!
//! A response file holds extra command-line arguments:
//! - arguments are separated by spaces or tabs
//! - a line whose first non-blank character is `#` is a comment
//! - blank lines are ignored
//! - LF and CRLF line endings are both accepted
//!
//! There is no quoting or escaping, so an argument cannot contain whitespace.
//! Tokens keep their raw bytes, so paths that are not valid UTF-8 survive on
//! platforms where the OS string is a byte string.
//! A token such as `@other.txt` is returned as-is; deciding that it refers to
//! another response file is up to the option resolver.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

/// Read a response file and split it into arguments.
pub fn read_response_file(path: &Path) -> io::Result<Vec<OsString>> {
    let contents = fs::read(path)?;
    Ok(tokenize(&contents))
}

/// Split response-file contents into arguments.
///
/// # Examples
///
/// ```
/// use tilegfx::response_file::tokenize;
///
/// let tokens = tokenize(b"# comment\n\nfoo bar\n");
/// assert_eq!(tokens, vec!["foo", "bar"]);
/// ```
pub fn tokenize(contents: &[u8]) -> Vec<OsString> {
    let mut tokens = Vec::new();

    for line in contents.split(|&c| c == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let start = line.iter().position(|&c| !is_blank(c)).unwrap_or(line.len());
        let line = &line[start..];

        if line.first() == Some(&b'#') {
            continue;
        }

        tokens.extend(
            line.split(|&c| is_blank(c) || c == b'\r')
                .filter(|token| !token.is_empty())
                .map(token_to_os),
        );
    }

    tokens
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

#[cfg(unix)]
fn token_to_os(token: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(token).to_os_string()
}

// Elsewhere OS strings are not byte strings; keep what decodes.
#[cfg(not(unix))]
fn token_to_os(token: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(token).into_owned())
}
