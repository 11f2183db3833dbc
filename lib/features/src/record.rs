//! Part records and ingestion-row validation.

use crate::identity::content_id;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const COL_DESCRIPTION: &str = "Part Description";
pub const COL_MATERIAL: &str = "Material";
pub const COL_SIZE: &str = "Size";
pub const COL_OPERATIONS: &str = "Operations";
pub const COL_FINISH: &str = "Finish";
pub const COL_TARGET_PRICE: &str = "Target Price (CHF)";

#[derive(Error, Debug)]
pub enum IngestError {
    /// A structurally required column is absent. Fails the whole batch;
    /// nothing from the batch is committed.
    #[error("required column '{column}' missing on row {row}")]
    MissingColumn { column: String, row: usize },
}

/// A historical manufacturing part as ingested from the tabular source.
///
/// Identity is content-addressed: the id is a deterministic hash of the
/// description, so the same description always upserts the same entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub id: String,
    pub description: String,
    pub material: String,
    pub size: String,
    pub operations: String,
    pub finish: String,
    pub target_price: Option<f64>,
}

impl PartRecord {
    pub fn new(
        description: impl Into<String>,
        material: impl Into<String>,
        size: impl Into<String>,
        operations: impl Into<String>,
        finish: impl Into<String>,
        target_price: Option<f64>,
    ) -> Self {
        let description = description.into();
        Self {
            id: content_id(&description),
            description,
            material: material.into(),
            size: size.into(),
            operations: operations.into(),
            finish: finish.into(),
            target_price,
        }
    }

    /// Build records from pre-parsed tabular rows (JSON objects keyed by
    /// column name).
    ///
    /// Every row is validated for `Part Description` before any record is
    /// constructed: a missing description anywhere fails the batch with
    /// [`IngestError::MissingColumn`] and commits zero entries. All other
    /// columns degrade to empty string / `None` when absent or malformed.
    pub fn from_rows(rows: &[Value]) -> Result<Vec<PartRecord>, IngestError> {
        for (row_idx, row) in rows.iter().enumerate() {
            if string_field(row, COL_DESCRIPTION).is_none() {
                return Err(IngestError::MissingColumn {
                    column: COL_DESCRIPTION.to_string(),
                    row: row_idx,
                });
            }
        }

        Ok(rows
            .iter()
            .map(|row| {
                PartRecord::new(
                    string_field(row, COL_DESCRIPTION).unwrap_or_default(),
                    string_field(row, COL_MATERIAL).unwrap_or_default(),
                    string_field(row, COL_SIZE).unwrap_or_default(),
                    string_field(row, COL_OPERATIONS).unwrap_or_default(),
                    string_field(row, COL_FINISH).unwrap_or_default(),
                    number_field(row, COL_TARGET_PRICE),
                )
            })
            .collect())
    }
}

/// Read a column as a non-empty string. Numbers are rendered, everything
/// else (null, missing, objects) is treated as absent.
fn string_field(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(row: &Value, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
