use std::fmt::{Display, Formatter};

/// A parsed `KEY=VALUE` entry.
///
/// Two entries are equal when both key and value match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// One line of source text and its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub number: u32,
    pub text: String,
}

impl RawLine {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}
