use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;
use crate::repo::manifest::{JsonManifestStore, ManifestStore};

/// File name of the manifest inside the cache root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Source of fresh directory identifiers for new cache slots.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl<F: FnMut() -> String> IdGenerator for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// A manifest entry as seen by `skelly list`.
#[derive(Debug)]
pub struct CachedRepo {
    pub url: String,
    pub id: String,
    pub path: PathBuf,
    /// Whether the working copy directory currently exists.
    pub present: bool,
}

/// Persistent mapping from canonical URL to a stable local directory.
pub struct RepoCache<S = JsonManifestStore, G = UuidGenerator> {
    root: PathBuf,
    store: S,
    ids: G,
    loaded: bool,
}

impl RepoCache {
    /// Cache rooted at `root`, with the manifest stored inside it.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let store = JsonManifestStore::new(root.join(MANIFEST_FILE));
        RepoCache::with_store(root, store, UuidGenerator)
    }
}

impl<S: ManifestStore, G: IdGenerator> RepoCache<S, G> {
    pub fn with_store(root: impl Into<PathBuf>, store: S, ids: G) -> Self {
        Self {
            root: root.into(),
            store,
            ids,
            loaded: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.store.load()?;
            self.loaded = true;
        }
        Ok(())
    }

    /// Return the directory reserved for `url`, minting and persisting a
    /// new identifier the first time a URL is seen.
    ///
    /// The manifest is flushed before the directory exists, so an
    /// interruption leaves a mapping without a directory, which the sync
    /// engine re-initializes on the next run.
    pub fn ensure_slot(&mut self, url: &str) -> Result<PathBuf> {
        self.ensure_loaded()?;

        if let Some(id) = self.store.get(url) {
            debug!("Reusing cache slot {id} for {url}");
            return Ok(self.root.join(id));
        }

        let id = loop {
            let candidate = self.ids.next_id();
            if !self.store.contains_id(&candidate) {
                break candidate;
            }
            debug!("Identifier {candidate} already taken, minting another");
        };

        self.store.put(url, &id);
        self.store.flush()?;
        debug!("Minted cache slot {id} for {url}");

        Ok(self.root.join(id))
    }

    /// List every manifest entry.
    pub fn slots(&mut self) -> Result<Vec<CachedRepo>> {
        self.ensure_loaded()?;
        Ok(self
            .store
            .entries()
            .iter()
            .map(|(url, id)| {
                let path = self.root.join(id);
                CachedRepo {
                    url: url.clone(),
                    id: id.clone(),
                    present: path.is_dir(),
                    path,
                }
            })
            .collect())
    }
}
