use thiserror::Error;

/// Errors crossing the retrieval/quoting pipeline boundary.
#[derive(Error, Debug)]
pub enum QuotingError {
    #[error(transparent)]
    Ingest(#[from] quotx_features::IngestError),

    #[error(transparent)]
    Provider(#[from] quotx_providers::ProviderError),

    #[error(transparent)]
    Quote(#[from] quotx_quote::QuoteError),

    #[error(transparent)]
    Index(#[from] quotx_core::Error),

    #[error(transparent)]
    Storage(#[from] quotx_storage::SnapshotError),
}
