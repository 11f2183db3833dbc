//! # quotx Features
//!
//! Part records, ingestion-row validation, content-addressed identity, and
//! feature engineering for the quotx quoting engine.
//!
//! The extraction pipeline is deliberately infallible at the field level:
//! malformed sizes degrade to `None`, missing optional columns to empty
//! strings. The single structural error is a batch-fatal missing
//! `Part Description` column on ingestion.

pub mod compose;
pub mod features;
pub mod identity;
pub mod record;

pub use compose::{embedding_text, QueryPart};
pub use features::{count_operations, parse_volume, size_label, PartFeatures, SizeLabel};
pub use identity::content_id;
pub use record::{IngestError, PartRecord};
