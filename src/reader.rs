use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::RawLine;

/// Source of raw `.env` lines.
pub trait Reader {
    /// Return the lines of `filename` inside `directory`, or
    /// [`Error::MissingFile`] when it cannot be read.
    fn read(&self, directory: &Path, filename: &str) -> Result<Vec<RawLine>, Error>;
}

/// Reads `.env` files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FsReader {
    /// Resolve the file path for `directory` and `filename`.
    ///
    /// A directory whose last component already equals `filename` is taken
    /// to be the file itself.
    pub fn resolve(directory: &Path, filename: &str) -> PathBuf {
        if directory.file_name().is_some_and(|name| name == filename) {
            return directory.to_path_buf();
        }
        directory.join(filename)
    }
}

impl Reader for FsReader {
    fn read(&self, directory: &Path, filename: &str) -> Result<Vec<RawLine>, Error> {
        let path = Self::resolve(directory, filename);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "read env file");
                Ok(split_lines(&text))
            }
            Err(source) => Err(Error::MissingFile { path, source }),
        }
    }
}

/// Split text into numbered lines, dropping a leading byte-order mark.
///
/// `\n`, `\r\n` and a bare `\r` all end a line.
pub fn split_lines(text: &str) -> Vec<RawLine> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    normalize_newlines(text)
        .lines()
        .zip(1u32..)
        .map(|(line, number)| RawLine::new(number, line))
        .collect()
}

fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }

    Cow::Owned(out)
}
