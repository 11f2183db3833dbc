//! # quotx
//!
//! A similarity-anchored quoting engine for CNC manufacturing parts.
//!
//! quotx retrieves the historical part most similar to a newly described one
//! and derives a cost breakdown anchored to that part's price: the four
//! categories always sum to the total, the total is pinned to the reference
//! price (business floor aside), no category exceeds 60%, and absent
//! attributes cost nothing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quotx::prelude::*;
//! use std::sync::Arc;
//!
//! let store = Arc::new(IndexStore::open("./data")?);
//! let retrieval = RetrievalService::new(store, "parts", Arc::new(HashEmbedder::default()));
//!
//! # let rows: Vec<serde_json::Value> = Vec::new();
//! let records = PartRecord::from_rows(&rows)?;
//! retrieval.build_index(&records)?;
//!
//! let mut session = QuoteSession::new(retrieval, QuoteEngine::rule_based());
//! match session.quote(&QueryPart::from_description("Aluminum bracket, 100x50x5 mm"))? {
//!     QuoteOutcome::Complete { breakdown, .. } => println!("CHF {}", breakdown.total_quote),
//!     QuoteOutcome::NoMatchFound => println!("index is empty - ingest parts first"),
//!     QuoteOutcome::DerivationFailed { error, .. } => println!("manual quote needed: {error}"),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - `quotx-core` - vectors, points, the collection index
//! - `quotx-features` - records, identity hashing, feature engineering
//! - `quotx-providers` - embedding and completion capabilities
//! - `quotx-quote` - constrained quote derivation
//! - `quotx-storage` - durable snapshot persistence

pub mod error;
pub mod retrieval;
pub mod session;

pub use error::QuotingError;
pub use retrieval::{PartMatch, RetrievalService, DEFAULT_COLLECTION};
pub use session::{QuoteOutcome, QuoteSession, SessionState};

// Re-export member-crate surfaces.
pub use quotx_core::{Collection, CollectionConfig, Distance, Point, Vector};
pub use quotx_features::{
    content_id, embedding_text, parse_volume, size_label, IngestError, PartFeatures, PartRecord,
    QueryPart, SizeLabel,
};
pub use quotx_providers::{
    Completion, Embedder, HashEmbedder, OpenAiCompletion, OpenAiEmbedder, ProviderConfig,
    ProviderError,
};
pub use quotx_quote::{QuoteBreakdown, QuoteEngine, QuoteError, ReferencePart};
pub use quotx_storage::IndexStore;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Collection, CollectionConfig, Distance, Point, Vector,
        content_id, parse_volume, IngestError, PartFeatures, PartRecord, QueryPart, SizeLabel,
        Completion, Embedder, HashEmbedder, OpenAiCompletion, OpenAiEmbedder, ProviderConfig,
        ProviderError,
        QuoteBreakdown, QuoteEngine, QuoteError, ReferencePart,
        IndexStore,
        PartMatch, QuoteOutcome, QuoteSession, QuotingError, RetrievalService, SessionState,
    };
}
