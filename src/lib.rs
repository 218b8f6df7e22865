//! Parse `.env` files and query them alongside the real environment.
//!
//! [`Dotenv::load`] reads `./.env` with strict error handling and returns an
//! immutable [`Dotenv`] store. [`Dotenv::configure`] returns a
//! [`DotenvBuilder`] for choosing the directory, filename and tolerance flags.
//!
//! Lookups through [`Dotenv::get`] always prefer the real environment over
//! values read from the file.
//!
//! Injecting entries into the live process environment requires a
//! [`PropertySink::process`] sink, which is `unsafe` because callers must
//! guarantee no concurrent process-environment access.

mod env;
mod error;
mod loader;
mod model;
mod parser;
mod reader;
mod store;

pub use env::{PropertySink, SystemEnv};
pub use error::{Error, MalformedEntry, MalformedKind};
pub use loader::DotenvBuilder;
pub use model::{Entry, RawLine};
pub use parser::{Parser, parse_reader, parse_str, parse_str_with_env};
pub use reader::{FsReader, Reader, split_lines};
pub use store::Dotenv;
