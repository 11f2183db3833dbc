use crate::{Error, Point, Result, Vector};
use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for a part collection.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub vector_dim: usize,
    pub distance: Distance,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vector_dim: 64,
            distance: Distance::Cosine,
        }
    }
}

/// Similarity metric. The same metric scores inserts and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    #[default]
    Cosine,
    Euclidean,
    Dot,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "Cosine",
            Distance::Euclidean => "Euclidean",
            Distance::Dot => "Dot",
        }
    }

    /// Parse a metric name; unrecognized names fall back to cosine.
    pub fn parse(s: &str) -> Self {
        match s {
            "Euclidean" => Distance::Euclidean,
            "Dot" => Distance::Dot,
            _ => Distance::Cosine,
        }
    }
}

/// A collection of indexed parts supporting upsert-by-id and k-nearest-neighbor
/// queries.
///
/// The point map is the single source of truth for similarity search.
/// Concurrent upserts from multiple ingestion batches are safe; the last
/// writer wins per id. Insertion order never affects query results.
pub struct Collection {
    config: CollectionConfig,
    points: Arc<RwLock<HashMap<String, Point, RandomState>>>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            points: Arc::new(RwLock::new(HashMap::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn distance(&self) -> Distance {
        self.config.distance
    }

    pub fn count(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.read().is_empty()
    }

    /// Insert or update a point. An existing id is fully replaced: vector,
    /// document, and payload.
    pub fn upsert(&self, point: Point) -> Result<()> {
        if point.vector.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: point.vector.dim(),
            });
        }

        self.points.write().insert(point.id.clone(), point);
        Ok(())
    }

    /// Upsert a batch of points. Each id is written atomically; there is no
    /// cross-id transaction guarantee.
    pub fn batch_upsert(&self, points: Vec<Point>) -> Result<()> {
        for point in points {
            self.upsert(point)?;
        }
        Ok(())
    }

    /// Get a point by id.
    pub fn get(&self, id: &str) -> Option<Point> {
        self.points.read().get(id).cloned()
    }

    /// Delete a point by id. Returns whether it existed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.points.write().remove(id).is_some())
    }

    /// Remove every point.
    pub fn clear(&self) {
        self.points.write().clear();
    }

    /// Return the k entries nearest to `query`, ranked by descending score.
    ///
    /// Ties break by ascending id so results are deterministic regardless of
    /// insertion order. An empty collection yields an empty result.
    pub fn search(&self, query: &Vector, k: usize) -> Vec<(Point, f32)> {
        let points = self.points.read();

        let mut scored: Vec<(Point, f32)> = points
            .values()
            .map(|point| {
                let score = match self.config.distance {
                    Distance::Cosine => point.vector.cosine_similarity(query),
                    Distance::Euclidean => -point.vector.l2_distance(query),
                    Distance::Dot => point.vector.dot(query),
                };
                (point.clone(), score)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(k);
        scored
    }

    /// Full scan of stored entries, ordered by id. Used for verification and
    /// persistence round-trips.
    pub fn export(&self) -> Vec<Point> {
        let mut all: Vec<Point> = self.points.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}
