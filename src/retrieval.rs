//! The retrieval service: features + embedder + index composed into
//! index-build and nearest-match operations.

use crate::error::QuotingError;
use quotx_core::{Collection, Point};
use quotx_features::record::{
    COL_FINISH, COL_MATERIAL, COL_OPERATIONS, COL_SIZE, COL_TARGET_PRICE,
};
use quotx_features::{embedding_text, PartFeatures, PartRecord, QueryPart};
use quotx_providers::Embedder;
use quotx_quote::ReferencePart;
use quotx_storage::IndexStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_COLLECTION: &str = "parts";

/// One nearest-neighbor result, hydrated from the stored payload.
#[derive(Debug, Clone)]
pub struct PartMatch {
    pub id: String,
    pub score: f32,
    pub document: String,
    pub features: PartFeatures,
    pub reference_price: Option<f64>,
}

impl PartMatch {
    /// View this match as the reference a quote gets anchored to. A missing
    /// price surfaces later as `MissingReferencePrice`; retrieval itself
    /// does not reject unpriced matches.
    pub fn as_reference(&self) -> ReferencePart {
        ReferencePart {
            document: self.document.clone(),
            features: self.features.clone(),
            reference_price: self.reference_price.unwrap_or(0.0),
        }
    }
}

/// Builds and queries the part index.
///
/// The embedder is an injected capability; the service never constructs its
/// own provider client. All embedding goes through one batched call per
/// operation — queries embed a batch of one.
pub struct RetrievalService {
    store: Arc<IndexStore>,
    collection_name: String,
    embedder: Arc<dyn Embedder>,
}

impl RetrievalService {
    pub fn new(
        store: Arc<IndexStore>,
        collection_name: impl Into<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            store,
            collection_name: collection_name.into(),
            embedder,
        }
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn collection(&self) -> Option<Arc<Collection>> {
        self.store.get_collection(&self.collection_name)
    }

    /// Number of indexed parts.
    pub fn count(&self) -> usize {
        self.collection().map(|c| c.count()).unwrap_or(0)
    }

    /// Validate rows, then index the resulting records. A structurally
    /// invalid batch fails before anything is embedded or committed.
    pub fn ingest_rows(&self, rows: &[Value]) -> Result<usize, QuotingError> {
        let records = PartRecord::from_rows(rows)?;
        self.build_index(&records)
    }

    /// Index a batch of records: compose texts, embed them in one batch
    /// call, upsert by content id, persist. Re-ingesting identical records
    /// overwrites entries rather than duplicating them.
    pub fn build_index(&self, records: &[PartRecord]) -> Result<usize, QuotingError> {
        if records.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = records.iter().map(embedding_text).collect();
        let vectors = self.embedder.embed(&texts)?;
        let dim = vectors.first().map(|v| v.dim()).unwrap_or(0);

        let points: Vec<Point> = records
            .iter()
            .zip(texts)
            .zip(vectors)
            .map(|((record, text), vector)| {
                Point::new(record.id.clone(), vector, text, Some(metadata_payload(record)))
            })
            .collect();

        let collection = self.store.collection(&self.collection_name, dim);
        collection.batch_upsert(points)?;
        self.store.save_collection(&self.collection_name)?;

        info!(
            collection = %self.collection_name,
            indexed = records.len(),
            total = collection.count(),
            "index built"
        );
        Ok(records.len())
    }

    /// The k nearest historical parts for an ad-hoc query. An empty or
    /// absent collection yields an empty result without touching the
    /// embedding provider.
    pub fn find_nearest(&self, query: &QueryPart, k: usize) -> Result<Vec<PartMatch>, QuotingError> {
        let Some(collection) = self.collection() else {
            return Ok(Vec::new());
        };
        if collection.is_empty() {
            return Ok(Vec::new());
        }

        let texts = vec![query.embedding_text()];
        let mut vectors = self.embedder.embed(&texts)?;
        let Some(vector) = vectors.pop() else {
            return Ok(Vec::new());
        };

        let results = collection.search(&vector, k);
        debug!(candidates = results.len(), "nearest-neighbor query");
        Ok(results
            .into_iter()
            .map(|(point, score)| hydrate(point, score))
            .collect())
    }
}

/// Everything except the description goes into the payload, together with
/// the engineered features, so query results carry the full metadata row.
fn metadata_payload(record: &PartRecord) -> Value {
    let features = PartFeatures::from_record(record);
    json!({
        COL_MATERIAL: record.material,
        COL_SIZE: record.size,
        COL_OPERATIONS: record.operations,
        COL_FINISH: record.finish,
        COL_TARGET_PRICE: record.target_price,
        "Volume_mm3": features.volume_mm3,
        "Size_Label": features.size_label.to_string(),
        "Operations_Count": features.operations_count,
    })
}

fn hydrate(point: Point, score: f32) -> PartMatch {
    let price = point.payload_f64(COL_TARGET_PRICE);
    let features = PartFeatures::from_fields(
        point.payload_str(COL_MATERIAL).unwrap_or_default(),
        point.payload_str(COL_SIZE).unwrap_or_default(),
        point.payload_str(COL_OPERATIONS).unwrap_or_default(),
        point.payload_str(COL_FINISH).unwrap_or_default(),
        price,
    );

    PartMatch {
        id: point.id,
        score,
        document: point.document,
        features,
        reference_price: price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotx_providers::HashEmbedder;

    fn service(dir: &std::path::Path) -> RetrievalService {
        let store = Arc::new(IndexStore::open(dir).unwrap());
        RetrievalService::new(store, DEFAULT_COLLECTION, Arc::new(HashEmbedder::default()))
    }

    fn sample_records() -> Vec<PartRecord> {
        vec![
            PartRecord::new(
                "Aluminum bracket, 100x50x5 mm, drilling, anodized",
                "Aluminum",
                "100x50x5",
                "Drilling",
                "Anodized",
                Some(60.0),
            ),
            PartRecord::new(
                "Steel gear, 30x30x10 mm, milling, painted",
                "Steel",
                "30x30x10",
                "Milling",
                "Painted",
                Some(80.0),
            ),
        ]
    }

    #[test]
    fn test_build_index_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        assert_eq!(service.build_index(&sample_records()).unwrap(), 2);
        assert_eq!(service.count(), 2);
    }

    #[test]
    fn test_reindexing_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        service.build_index(&sample_records()).unwrap();
        service.build_index(&sample_records()).unwrap();
        assert_eq!(service.count(), 2);
    }

    #[test]
    fn test_find_nearest_on_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let query = QueryPart::from_description("Aluminum bracket");
        assert!(service.find_nearest(&query, 1).unwrap().is_empty());
    }

    #[test]
    fn test_metadata_round_trips_through_query() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        service.build_index(&sample_records()).unwrap();

        let query = QueryPart {
            description: "Steel gear, 30x30x10 mm, milling, painted".to_string(),
            material: "Steel".to_string(),
            size: "30x30x10".to_string(),
            operations: "Milling".to_string(),
            finish: "Painted".to_string(),
        };

        let matches = service.find_nearest(&query, 1).unwrap();
        let matched = &matches[0];
        assert_eq!(matched.features.material, "Steel");
        assert_eq!(matched.features.size_raw, "30x30x10");
        assert_eq!(matched.features.operations_count, 1);
        assert_eq!(matched.reference_price, Some(80.0));
    }

    #[test]
    fn test_empty_record_batch_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        assert_eq!(service.build_index(&[]).unwrap(), 0);
        assert_eq!(service.count(), 0);
    }
}
