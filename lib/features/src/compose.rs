//! Embedding-text composition.
//!
//! Embeddings are computed over one labeled string concatenating the
//! structured fields in a fixed order, not over the raw description alone.
//! The composed string is also what the index stores as the document.

use crate::features::PartFeatures;
use crate::record::PartRecord;
use serde::{Deserialize, Serialize};

/// An ad-hoc query part as entered by a user: a free-text description plus
/// whatever structured fields they filled in (missing fields stay empty).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryPart {
    pub description: String,
    pub material: String,
    pub size: String,
    pub operations: String,
    pub finish: String,
}

impl QueryPart {
    pub fn from_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn features(&self) -> PartFeatures {
        PartFeatures::from_fields(&self.material, &self.size, &self.operations, &self.finish, None)
    }

    pub fn embedding_text(&self) -> String {
        compose(
            &self.material,
            &self.size,
            &self.operations,
            &self.finish,
            &self.description,
        )
    }
}

/// Compose the embedding input for a stored record.
pub fn embedding_text(record: &PartRecord) -> String {
    compose(
        &record.material,
        &record.size,
        &record.operations,
        &record.finish,
        &record.description,
    )
}

/// Fixed label format and field order. Changing either invalidates every
/// stored vector, so the index would need a rebuild.
fn compose(material: &str, size: &str, operations: &str, finish: &str, description: &str) -> String {
    format!(
        "Material: {material} | Size: {size} | Operations: {operations} | Finish: {finish} | Description: {description}"
    )
}
