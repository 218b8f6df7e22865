use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configured file does not exist or could not be read.
    #[error("missing env file {}: {source}", .path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Malformed(#[from] MalformedEntry),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A line that violates the `.env` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed entry at line {line}: {kind}: {content:?}")]
pub struct MalformedEntry {
    pub line: u32,
    pub content: String,
    pub kind: MalformedKind,
}

impl MalformedEntry {
    pub(crate) fn new(line: u32, content: &str, kind: MalformedKind) -> Self {
        Self {
            line,
            content: content.to_owned(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    InvalidSyntax,
    MissingKey,
    InvalidKey,
    UnterminatedQuote,
    TrailingContent,
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSyntax => write!(f, "invalid syntax"),
            Self::MissingKey => write!(f, "missing key"),
            Self::InvalidKey => write!(f, "invalid key"),
            Self::UnterminatedQuote => write!(f, "unterminated quote"),
            Self::TrailingContent => write!(f, "unexpected content after closing quote"),
        }
    }
}
