//! The durable index store.

use crate::snapshot::{CollectionSnapshot, SnapshotError, SNAPSHOT_EXTENSION};
use parking_lot::RwLock;
use quotx_core::{Collection, CollectionConfig, Distance};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Manages part collections under one data directory, durable across
/// process restarts.
///
/// Collections have get-or-create semantics: asking for a name that does not
/// exist creates it; there is no "not found" error at this layer.
pub struct IndexStore {
    data_dir: PathBuf,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl IndexStore {
    /// Open a store, restoring every collection snapshot found under
    /// `data_dir`. A snapshot that fails its checksum is skipped with a
    /// warning; the rest of the store stays usable.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, SnapshotError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let mut collections = HashMap::new();
        for entry in fs::read_dir(&data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }

            match CollectionSnapshot::read(&path).and_then(CollectionSnapshot::restore) {
                Ok(collection) => {
                    info!(
                        collection = collection.name(),
                        points = collection.count(),
                        "restored collection snapshot"
                    );
                    collections.insert(collection.name().to_string(), Arc::new(collection));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable snapshot");
                }
            }
        }

        Ok(Self {
            data_dir,
            collections: RwLock::new(collections),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get a collection by name, creating it (cosine metric) if absent.
    pub fn collection(&self, name: &str, vector_dim: usize) -> Arc<Collection> {
        if let Some(existing) = self.collections.read().get(name) {
            return existing.clone();
        }

        let mut collections = self.collections.write();
        collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Collection::new(CollectionConfig {
                    name: name.to_string(),
                    vector_dim,
                    distance: Distance::Cosine,
                }))
            })
            .clone()
    }

    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Persist one collection.
    pub fn save_collection(&self, name: &str) -> Result<(), SnapshotError> {
        let Some(collection) = self.get_collection(name) else {
            return Ok(());
        };
        CollectionSnapshot::capture(&collection).write(&self.snapshot_path(name))
    }

    /// Persist every collection.
    pub fn save(&self) -> Result<(), SnapshotError> {
        let names = self.list_collections();
        for name in names {
            self.save_collection(&name)?;
        }
        Ok(())
    }

    /// Drop a collection and its snapshot file. Returns whether it existed.
    pub fn reset(&self, name: &str) -> Result<bool, SnapshotError> {
        let existed = self.collections.write().remove(name).is_some();
        let path = self.snapshot_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(existed)
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{SNAPSHOT_EXTENSION}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotx_core::{Point, Vector};

    fn point(id: &str) -> Point {
        Point::new(id, Vector::new(vec![1.0, 0.0, 0.0]), format!("doc {id}"), None)
    }

    #[test]
    fn test_get_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();

        assert!(store.get_collection("parts").is_none());
        let created = store.collection("parts", 3);
        assert_eq!(created.count(), 0);

        let again = store.collection("parts", 3);
        assert_eq!(again.name(), "parts");
        assert_eq!(store.list_collections(), vec!["parts"]);
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = IndexStore::open(dir.path()).unwrap();
            let collection = store.collection("parts", 3);
            collection.upsert(point("a")).unwrap();
            collection.upsert(point("b")).unwrap();
            store.save().unwrap();
        }

        let reopened = IndexStore::open(dir.path()).unwrap();
        let restored = reopened.get_collection("parts").unwrap();
        assert_eq!(restored.count(), 2);
        assert_eq!(restored.get("a").unwrap().document, "doc a");
    }

    #[test]
    fn test_reset_drops_collection_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();

        store.collection("parts", 3).upsert(point("a")).unwrap();
        store.save().unwrap();
        assert!(dir.path().join("parts.snapshot").exists());

        assert!(store.reset("parts").unwrap());
        assert!(store.get_collection("parts").is_none());
        assert!(!dir.path().join("parts.snapshot").exists());

        // Resetting again is a no-op, not an error.
        assert!(!store.reset("parts").unwrap());
    }

    #[test]
    fn test_unreadable_snapshot_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.snapshot"), b"not a snapshot").unwrap();

        let store = IndexStore::open(dir.path()).unwrap();
        assert!(store.list_collections().is_empty());
    }
}
