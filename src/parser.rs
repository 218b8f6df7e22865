use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use crate::env::SystemEnv;
use crate::error::{Error, MalformedEntry, MalformedKind};
use crate::model::{Entry, RawLine};
use crate::reader::{Reader, split_lines};

/// Parse dotenv entries from UTF-8 text, interpolating against the process
/// environment.
pub fn parse_str(input: &str) -> Result<Vec<Entry>, Error> {
    parse_str_with_env(input, &SystemEnv::process())
}

/// Parse dotenv entries from UTF-8 text, interpolating against `env`.
pub fn parse_str_with_env(input: &str, env: &SystemEnv) -> Result<Vec<Entry>, Error> {
    Parser::new(env)
        .parse(&split_lines(input))
        .map_err(Error::from)
}

/// Parse dotenv entries from a buffered reader.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Vec<Entry>, Error> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    parse_str(&buf)
}

/// Line-oriented `.env` parser.
///
/// Both tolerance flags default to strict: a missing file or the first
/// malformed line fails the parse.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
    env: &'a SystemEnv,
    throw_if_missing: bool,
    throw_if_malformed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(env: &'a SystemEnv) -> Self {
        Self {
            env,
            throw_if_missing: true,
            throw_if_malformed: true,
        }
    }

    pub fn throw_if_missing(mut self, throw_if_missing: bool) -> Self {
        self.throw_if_missing = throw_if_missing;
        self
    }

    pub fn throw_if_malformed(mut self, throw_if_malformed: bool) -> Self {
        self.throw_if_malformed = throw_if_malformed;
        self
    }

    /// Read `filename` from `directory` through `reader` and parse it.
    ///
    /// A missing file yields no entries unless missing files are fatal.
    pub fn read<R: Reader + ?Sized>(
        &self,
        reader: &R,
        directory: &Path,
        filename: &str,
    ) -> Result<Vec<Entry>, Error> {
        let lines = match reader.read(directory, filename) {
            Ok(lines) => lines,
            Err(err @ Error::MissingFile { .. }) if !self.throw_if_missing => {
                tracing::debug!(error = %err, "env file missing, continuing without entries");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        Ok(self.parse(&lines)?)
    }

    /// Parse `lines` into entries in file order, duplicates included.
    pub fn parse(&self, lines: &[RawLine]) -> Result<Vec<Entry>, MalformedEntry> {
        let mut state = ParseState::new(self.env);
        let mut mode = Mode::Normal;
        let mut idx = 0usize;

        loop {
            let Some(line) = lines.get(idx) else {
                let Mode::InDoubleQuote(open) = mode else {
                    break;
                };
                let opening = &lines[open.opened_at];
                self.reject(MalformedEntry::new(
                    opening.number,
                    &opening.text,
                    MalformedKind::UnterminatedQuote,
                ))?;
                // Everything after the opening line was swallowed by the
                // quote; reparse it as ordinary lines.
                mode = Mode::Normal;
                idx = open.opened_at + 1;
                continue;
            };

            let step = match std::mem::replace(&mut mode, Mode::Normal) {
                Mode::Normal => state.start_line(line, idx),
                Mode::InDoubleQuote(open) => state.continue_quote(open, line),
            };
            match step {
                Ok(Step::Skip) => {}
                Ok(Step::Entry(entry)) => state.define(entry),
                Ok(Step::Open(open)) => mode = Mode::InDoubleQuote(open),
                Err(err) => self.reject(err)?,
            }
            idx += 1;
        }

        tracing::debug!(entries = state.entries.len(), "parsed env entries");
        Ok(state.entries)
    }

    fn reject(&self, err: MalformedEntry) -> Result<(), MalformedEntry> {
        if self.throw_if_malformed {
            return Err(err);
        }
        tracing::warn!(line = err.line, kind = %err.kind, "skipping malformed env entry");
        Ok(())
    }
}

enum Mode {
    Normal,
    InDoubleQuote(OpenQuote),
}

/// A double-quoted value whose closing quote has not been seen yet.
struct OpenQuote {
    key: String,
    value: String,
    /// Index of the opening line in the input slice.
    opened_at: usize,
}

enum Step {
    Skip,
    Entry(Entry),
    Open(OpenQuote),
}

struct ParseState<'a> {
    env: &'a SystemEnv,
    entries: Vec<Entry>,
    /// Key to the index of its latest entry.
    defined: HashMap<String, usize>,
}

impl<'a> ParseState<'a> {
    fn new(env: &'a SystemEnv) -> Self {
        Self {
            env,
            entries: Vec::new(),
            defined: HashMap::new(),
        }
    }

    fn define(&mut self, entry: Entry) {
        self.defined.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
    }

    fn lookup(&self, name: &str) -> String {
        if let Some(&idx) = self.defined.get(name) {
            return self.entries[idx].value.clone();
        }
        self.env.var(name).unwrap_or_default()
    }

    fn start_line(&self, line: &RawLine, idx: usize) -> Result<Step, MalformedEntry> {
        let malformed = |kind| MalformedEntry::new(line.number, &line.text, kind);

        let mut working = line.text.trim_start();
        if working.is_empty() || working.starts_with('#') {
            return Ok(Step::Skip);
        }

        if let Some(rest) = working.strip_prefix("export")
            && rest.starts_with(char::is_whitespace)
        {
            working = rest.trim_start();
        }

        let Some(sep_idx) = working.find(['=', ':']) else {
            return Err(malformed(MalformedKind::InvalidSyntax));
        };

        let key = working[..sep_idx].trim_end();
        if key.is_empty() {
            return Err(malformed(MalformedKind::MissingKey));
        }
        if !key.chars().all(is_key_char) {
            return Err(malformed(MalformedKind::InvalidKey));
        }

        let value_input = working[sep_idx + 1..].trim_start();

        if let Some(body) = value_input.strip_prefix('"') {
            let mut value = String::with_capacity(body.len());
            return match self.scan_double_quoted(body, &mut value) {
                Some(end) if is_blank_or_comment(&body[end..]) => {
                    Ok(Step::Entry(Entry::new(key, value)))
                }
                Some(_) => Err(malformed(MalformedKind::TrailingContent)),
                None => {
                    value.push('\n');
                    Ok(Step::Open(OpenQuote {
                        key: key.to_owned(),
                        value,
                        opened_at: idx,
                    }))
                }
            };
        }

        if let Some(body) = value_input.strip_prefix('\'') {
            let Some(end) = body.find('\'') else {
                return Err(malformed(MalformedKind::UnterminatedQuote));
            };
            if !is_blank_or_comment(&body[end + 1..]) {
                return Err(malformed(MalformedKind::TrailingContent));
            }
            return Ok(Step::Entry(Entry::new(key, &body[..end])));
        }

        let raw = value_input
            .split_once('#')
            .map_or(value_input, |(head, _)| head)
            .trim_end();
        Ok(Step::Entry(Entry::new(key, self.interpolate(raw))))
    }

    fn continue_quote(&self, mut open: OpenQuote, line: &RawLine) -> Result<Step, MalformedEntry> {
        match self.scan_double_quoted(&line.text, &mut open.value) {
            Some(end) if is_blank_or_comment(&line.text[end..]) => Ok(Step::Entry(Entry {
                key: open.key,
                value: open.value,
            })),
            Some(_) => Err(MalformedEntry::new(
                line.number,
                &line.text,
                MalformedKind::TrailingContent,
            )),
            None => {
                open.value.push('\n');
                Ok(Step::Open(open))
            }
        }
    }

    /// Decode double-quoted text into `out` until the closing quote.
    ///
    /// Returns the byte offset just past the closing quote, or `None` when
    /// `text` ends while the quote is still open.
    fn scan_double_quoted(&self, text: &str, out: &mut String) -> Option<usize> {
        let mut idx = 0usize;
        while let Some(ch) = text[idx..].chars().next() {
            idx += ch.len_utf8();
            match ch {
                '"' => return Some(idx),
                '\\' => {
                    let Some(next) = text[idx..].chars().next() else {
                        out.push('\\');
                        break;
                    };
                    idx += next.len_utf8();
                    match next {
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        '"' | '\\' => out.push(next),
                        _ => {
                            out.push('\\');
                            out.push(next);
                        }
                    }
                }
                '$' => match parse_reference(text, idx - 1) {
                    Some((name, end)) => {
                        out.push_str(&self.lookup(name));
                        idx = end;
                    }
                    None => out.push('$'),
                },
                _ => out.push(ch),
            }
        }
        None
    }

    fn interpolate(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut cursor = 0usize;
        let mut idx = 0usize;
        let bytes = input.as_bytes();

        while idx < bytes.len() {
            if bytes[idx] != b'$' {
                idx += 1;
                continue;
            }

            let Some((name, end)) = parse_reference(input, idx) else {
                idx += 1;
                continue;
            };

            out.push_str(&input[cursor..idx]);
            out.push_str(&self.lookup(name));
            cursor = end;
            idx = end;
        }

        out.push_str(&input[cursor..]);
        out
    }
}

/// Parse a `$NAME` or `${NAME}` reference starting at the `$` at `start`.
///
/// Returns the name and the byte offset just past the reference.
fn parse_reference(input: &str, start: usize) -> Option<(&str, usize)> {
    let rest = &input[start + 1..];

    if let Some(braced) = rest.strip_prefix('{') {
        let close = braced.find('}')?;
        let name = &braced[..close];
        if name.is_empty() || !name.bytes().all(is_name_byte) {
            return None;
        }
        return Some((name, start + 2 + close + 1));
    }

    let len = rest.bytes().take_while(|byte| is_name_byte(*byte)).count();
    if len == 0 {
        return None;
    }
    Some((&rest[..len], start + 1 + len))
}

fn is_blank_or_comment(tail: &str) -> bool {
    let tail = tail.trim();
    tail.is_empty() || tail.starts_with('#')
}

fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
