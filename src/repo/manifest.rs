use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;

use crate::error::{Result, SkellyError};

/// Key-value store behind the cache manifest: canonical URL -> directory identifier.
pub trait ManifestStore {
    /// Load persisted entries, bootstrapping an empty store if none exists yet.
    fn load(&mut self) -> Result<()>;

    fn get(&self, url: &str) -> Option<&str>;

    fn put(&mut self, url: &str, id: &str);

    /// Persist the in-memory entries.
    fn flush(&mut self) -> Result<()>;

    fn entries(&self) -> &BTreeMap<String, String>;

    /// True if any URL already maps to `id`.
    fn contains_id(&self, id: &str) -> bool {
        self.entries().values().any(|v| v == id)
    }
}

/// Manifest persisted as a pretty-printed JSON object.
#[derive(Debug)]
pub struct JsonManifestStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    fn read_file(&self) -> Result<BTreeMap<String, String>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| SkellyError::Io {
            context: format!("reading cache manifest {}", self.path.display()),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SkellyError::ManifestCorrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SkellyError::Io {
                context: format!("creating cache directory {}", parent.display()),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(entries).map_err(|e| SkellyError::Io {
            context: format!("encoding cache manifest {}", self.path.display()),
            source: e.into(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| SkellyError::Io {
            context: format!("writing cache manifest {}", self.path.display()),
            source: e,
        })
    }
}

impl ManifestStore for JsonManifestStore {
    fn load(&mut self) -> Result<()> {
        if !self.path.exists() {
            debug!("Bootstrapping empty cache manifest at {}", self.path.display());
            self.write_file(&BTreeMap::new())?;
        }
        self.entries = self.read_file()?;
        Ok(())
    }

    fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    fn put(&mut self, url: &str, id: &str) {
        self.entries.insert(url.to_string(), id.to_string());
    }

    fn flush(&mut self) -> Result<()> {
        // Another invocation may have added entries since `load`; keep theirs,
        // ours win on conflicting keys.
        let mut merged = if self.path.exists() {
            self.read_file()?
        } else {
            BTreeMap::new()
        };
        merged.extend(std::mem::take(&mut self.entries));
        self.write_file(&merged)?;
        self.entries = merged;
        Ok(())
    }

    fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    entries: BTreeMap<String, String>,
    /// Number of times `flush` was called.
    pub flushes: usize,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            flushes: 0,
        }
    }
}

impl ManifestStore for MemoryManifestStore {
    fn load(&mut self) -> Result<()> {
        Ok(())
    }

    fn get(&self, url: &str) -> Option<&str> {
        self.entries.get(url).map(String::as_str)
    }

    fn put(&mut self, url: &str, id: &str) {
        self.entries.insert(url.to_string(), id.to_string());
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}
