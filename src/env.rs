use std::collections::BTreeMap;

/// Read-only view of the real environment.
///
/// Values found here take precedence over file entries in
/// [`Dotenv::get`](crate::Dotenv::get) and serve as the fallback for
/// `$NAME` interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemEnv {
    kind: SystemEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SystemEnvKind {
    /// Read the current process environment on every lookup.
    Process,
    /// Read from an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::process()
    }
}

impl SystemEnv {
    /// Read the live process environment.
    pub fn process() -> Self {
        Self {
            kind: SystemEnvKind::Process,
        }
    }

    /// An environment with no variables.
    pub fn empty() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: SystemEnvKind::Memory(map),
        }
    }

    pub fn var(&self, key: &str) -> Option<String> {
        match &self.kind {
            SystemEnvKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            SystemEnvKind::Memory(map) => map.get(key).cloned(),
        }
    }

    /// Snapshot every variable currently visible.
    pub fn vars(&self) -> BTreeMap<String, String> {
        match &self.kind {
            SystemEnvKind::Process => std::env::vars_os()
                .map(|(key, value)| {
                    (
                        key.to_string_lossy().into_owned(),
                        value.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
            SystemEnvKind::Memory(map) => map.clone(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SystemEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_memory(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Destination for injected properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySink {
    kind: PropertySinkKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PropertySinkKind {
    /// Write through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    Memory(BTreeMap<String, String>),
}

impl Default for PropertySink {
    fn default() -> Self {
        Self::memory()
    }
}

impl PropertySink {
    /// Create a sink that writes into the current process environment.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment while properties are being injected.
    pub unsafe fn process() -> Self {
        Self {
            kind: PropertySinkKind::Process,
        }
    }

    /// Create an in-memory sink.
    pub fn memory() -> Self {
        Self {
            kind: PropertySinkKind::Memory(BTreeMap::new()),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            PropertySinkKind::Memory(map) => Some(map),
            PropertySinkKind::Process => None,
        }
    }

    pub(crate) fn set_property(&mut self, key: &str, value: &str) {
        match &mut self.kind {
            PropertySinkKind::Process => {
                // The process environment cannot hold NUL bytes.
                if value.contains('\0') {
                    tracing::warn!(key, "skipping property with NUL byte in value");
                    return;
                }
                // SAFETY: upheld by the caller of `PropertySink::process`.
                unsafe { std::env::set_var(key, value) }
            }
            PropertySinkKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}
