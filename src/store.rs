use std::collections::{BTreeMap, BTreeSet};

use crate::env::SystemEnv;
use crate::error::Error;
use crate::loader::DotenvBuilder;
use crate::model::Entry;

/// Immutable result of a successful load.
///
/// Lookups consult the real environment first and fall back to values read
/// from the file.
#[derive(Debug, Clone)]
pub struct Dotenv {
    file: BTreeMap<String, String>,
    snapshot: BTreeSet<Entry>,
    env: SystemEnv,
}

impl Dotenv {
    /// Start configuring a load.
    pub fn configure() -> DotenvBuilder {
        DotenvBuilder::new()
    }

    /// Load `./.env` with default settings.
    pub fn load() -> Result<Self, Error> {
        DotenvBuilder::new().load()
    }

    /// Build a store from parsed entries. Later entries win for duplicate keys.
    pub fn from_entries<I>(entries: I, env: SystemEnv) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        let file = entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect::<BTreeMap<_, _>>();
        let snapshot = env
            .vars()
            .into_iter()
            .map(|(key, value)| Entry { key, value })
            .collect();

        tracing::debug!(file_entries = file.len(), "built dotenv store");
        Self {
            file,
            snapshot,
            env,
        }
    }

    /// Real-environment entries captured when the store was built.
    pub fn entries(&self) -> &BTreeSet<Entry> {
        &self.snapshot
    }

    /// Entries read from the file, one per key.
    pub fn file_entries(&self) -> BTreeSet<Entry> {
        self.file
            .iter()
            .map(|(key, value)| Entry::new(key, value))
            .collect()
    }

    /// Look up `key`, preferring the real environment over the file.
    pub fn get(&self, key: &str) -> Option<String> {
        self.env.var(key).or_else(|| self.file.get(key).cloned())
    }

    /// Look up `key`, returning `default` when neither source defines it.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(&str, &str)], env: &[(&str, &str)]) -> Dotenv {
        Dotenv::from_entries(
            entries.iter().map(|(key, value)| Entry::new(*key, *value)),
            env.iter().copied().collect(),
        )
    }

    #[test]
    fn get_prefers_real_environment() {
        let dotenv = store(&[("PORT", "8080"), ("HOST", "file")], &[("HOST", "real")]);
        assert_eq!(dotenv.get("HOST").as_deref(), Some("real"));
        assert_eq!(dotenv.get("PORT").as_deref(), Some("8080"));
        assert_eq!(dotenv.get("MISSING"), None);
    }

    #[test]
    fn get_or_uses_default_when_absent() {
        let dotenv = store(&[("A", "1")], &[]);
        assert_eq!(dotenv.get_or("A", "x"), "1");
        assert_eq!(dotenv.get_or("B", "x"), "x");
    }

    #[test]
    fn file_entries_keep_last_duplicate() {
        let dotenv = store(&[("A", "1"), ("B", "2"), ("A", "3")], &[]);
        let expected = BTreeSet::from([Entry::new("A", "3"), Entry::new("B", "2")]);
        assert_eq!(dotenv.file_entries(), expected);
    }

    #[test]
    fn entries_snapshot_real_environment_only() {
        let dotenv = store(&[("FILE_ONLY", "1")], &[("REAL", "yes")]);
        let expected = BTreeSet::from([Entry::new("REAL", "yes")]);
        assert_eq!(dotenv.entries(), &expected);
    }
}
