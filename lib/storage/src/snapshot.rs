//! Collection snapshot files.
//!
//! One bincode file per collection, written atomically (temp file + rename)
//! and carrying a SHA-256 checksum of the payload. A snapshot that fails the
//! checksum on load is rejected rather than silently restored.

use quotx_core::{Collection, CollectionConfig, Distance, Point, Vector};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const SNAPSHOT_EXTENSION: &str = "snapshot";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Encode(String),

    #[error("snapshot decoding error: {0}")]
    Decode(String),

    #[error("snapshot checksum mismatch for {path}")]
    ChecksumMismatch { path: String },
}

/// On-disk form of one collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub name: String,
    pub vector_dim: usize,
    pub distance: String,
    pub points: Vec<PointData>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointData {
    pub id: String,
    pub vector: Vec<f32>,
    pub document: String,
    pub payload: Option<serde_json::Value>,
}

/// Envelope pairing the payload with its checksum.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    checksum: [u8; 32],
    payload: Vec<u8>,
}

impl CollectionSnapshot {
    pub fn capture(collection: &Collection) -> Self {
        Self {
            name: collection.name().to_string(),
            vector_dim: collection.vector_dim(),
            distance: collection.distance().as_str().to_string(),
            points: collection
                .export()
                .into_iter()
                .map(|point| PointData {
                    id: point.id,
                    vector: point.vector.as_slice().to_vec(),
                    document: point.document,
                    payload: point.payload,
                })
                .collect(),
        }
    }

    /// Rebuild a live collection from the snapshot.
    pub fn restore(self) -> Result<Collection, SnapshotError> {
        let collection = Collection::new(CollectionConfig {
            name: self.name,
            vector_dim: self.vector_dim,
            distance: Distance::parse(&self.distance),
        });

        for point in self.points {
            collection
                .upsert(Point::new(
                    point.id,
                    Vector::new(point.vector),
                    point.document,
                    point.payload,
                ))
                .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        }

        Ok(collection)
    }

    /// Write atomically: serialize, checksum, replace the target file.
    ///
    /// The collection payload is JSON (point payloads are arbitrary JSON
    /// values, which a non-self-describing encoding cannot round-trip);
    /// the outer checksum envelope is bincode.
    pub fn write(&self, path: &Path) -> Result<(), SnapshotError> {
        let payload = serde_json::to_vec(self).map_err(|e| SnapshotError::Encode(e.to_string()))?;
        let envelope = SnapshotEnvelope {
            checksum: Sha256::digest(&payload).into(),
            payload,
        };
        let bytes =
            bincode::serialize(&envelope).map_err(|e| SnapshotError::Encode(e.to_string()))?;

        let file = atomicwrites::AtomicFile::new(path, atomicwrites::AllowOverwrite);
        file.write(|f| std::io::Write::write_all(f, &bytes))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(err) | atomicwrites::Error::User(err) => {
                    SnapshotError::Io(err)
                }
            })?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path)?;
        let envelope: SnapshotEnvelope =
            bincode::deserialize(&bytes).map_err(|e| SnapshotError::Decode(e.to_string()))?;

        let checksum: [u8; 32] = Sha256::digest(&envelope.payload).into();
        if checksum != envelope.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                path: path.display().to_string(),
            });
        }

        serde_json::from_slice(&envelope.payload).map_err(|e| SnapshotError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_collection() -> Collection {
        let collection = Collection::new(CollectionConfig {
            name: "parts".to_string(),
            vector_dim: 3,
            distance: Distance::Cosine,
        });
        collection
            .upsert(Point::new(
                "a",
                Vector::new(vec![1.0, 0.0, 0.0]),
                "Material: Steel",
                Some(json!({"Material": "Steel"})),
            ))
            .unwrap();
        collection
            .upsert(Point::new(
                "b",
                Vector::new(vec![0.0, 1.0, 0.0]),
                "Material: Brass",
                None,
            ))
            .unwrap();
        collection
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.snapshot");

        CollectionSnapshot::capture(&sample_collection())
            .write(&path)
            .unwrap();

        let restored = CollectionSnapshot::read(&path).unwrap().restore().unwrap();
        assert_eq!(restored.name(), "parts");
        assert_eq!(restored.count(), 2);
        assert_eq!(
            restored.get("a").unwrap().payload_str("Material"),
            Some("Steel")
        );
    }

    #[test]
    fn test_corrupted_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts.snapshot");

        CollectionSnapshot::capture(&sample_collection())
            .write(&path)
            .unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert!(CollectionSnapshot::read(&path).is_err());
    }
}
