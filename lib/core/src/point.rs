use crate::vector::Vector;
use serde::{Deserialize, Serialize};

/// An indexed entry: content-addressed id, embedding vector, the composed
/// document text the vector was produced from, and structured metadata.
///
/// The collection is the single owner of points; the same id always refers to
/// the same part description, so re-inserting an id replaces the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub vector: Vector,
    /// The labeled text that was embedded, stored verbatim so query results
    /// can surface what was actually matched against.
    pub document: String,
    /// Non-description record fields (material, size, operations, finish,
    /// price) plus engineered features.
    pub payload: Option<serde_json::Value>,
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        vector: Vector,
        document: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            vector,
            document: document.into(),
            payload,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Fetch a string field out of the payload, if present.
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(field))
            .and_then(|v| v.as_str())
    }

    /// Fetch a numeric field out of the payload, if present.
    pub fn payload_f64(&self, field: &str) -> Option<f64> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(field))
            .and_then(|v| v.as_f64())
    }
}
