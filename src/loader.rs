use std::path::{Path, PathBuf};

use crate::env::{PropertySink, SystemEnv};
use crate::error::Error;
use crate::parser::Parser;
use crate::reader::{FsReader, Reader};
use crate::store::Dotenv;

/// Builder-style dotenv loader.
///
/// Defaults: `./.env`, strict about missing files and malformed lines, no
/// property injection, lookups against the live process environment.
#[derive(Debug, Clone)]
pub struct DotenvBuilder<R = FsReader> {
    directory: PathBuf,
    filename: String,
    throw_if_missing: bool,
    throw_if_malformed: bool,
    properties: Option<PropertySink>,
    env: SystemEnv,
    reader: R,
}

impl DotenvBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for DotenvBuilder {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./"),
            filename: String::from(".env"),
            throw_if_missing: true,
            throw_if_malformed: true,
            properties: None,
            env: SystemEnv::process(),
            reader: FsReader,
        }
    }
}

impl<R: Reader> DotenvBuilder<R> {
    /// Directory containing the `.env` file.
    pub fn directory(mut self, path: impl AsRef<Path>) -> Self {
        self.directory = path.as_ref().to_path_buf();
        self
    }

    /// Name of the file inside the directory. Defaults to `.env`.
    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.filename = name.into();
        self
    }

    /// Treat a missing file as an empty one.
    pub fn ignore_if_missing(mut self) -> Self {
        self.throw_if_missing = false;
        self
    }

    /// Skip malformed lines instead of failing.
    pub fn ignore_if_malformed(mut self) -> Self {
        self.throw_if_malformed = false;
        self
    }

    /// Write every file entry into `sink` on load.
    pub fn system_properties(mut self, sink: PropertySink) -> Self {
        self.properties = Some(sink);
        self
    }

    /// Environment used for lookup precedence and interpolation fallback.
    pub fn system_env(mut self, env: SystemEnv) -> Self {
        self.env = env;
        self
    }

    pub fn reader<T: Reader>(self, reader: T) -> DotenvBuilder<T> {
        DotenvBuilder {
            directory: self.directory,
            filename: self.filename,
            throw_if_missing: self.throw_if_missing,
            throw_if_malformed: self.throw_if_malformed,
            properties: self.properties,
            env: self.env,
            reader,
        }
    }

    pub fn property_sink(&self) -> Option<&PropertySink> {
        self.properties.as_ref()
    }

    pub fn into_property_sink(self) -> Option<PropertySink> {
        self.properties
    }

    pub fn load(&mut self) -> Result<Dotenv, Error> {
        let entries = Parser::new(&self.env)
            .throw_if_missing(self.throw_if_missing)
            .throw_if_malformed(self.throw_if_malformed)
            .read(&self.reader, &self.directory, &self.filename)?;

        if let Some(sink) = self.properties.as_mut() {
            for entry in &entries {
                tracing::trace!(key = %entry.key, "injecting property");
                sink.set_property(&entry.key, &entry.value);
            }
        }

        Ok(Dotenv::from_entries(entries, self.env.clone()))
    }
}
