use quotx_providers::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    /// The reasoning provider call itself failed. Retryability is the
    /// caller's decision via [`ProviderError::is_retryable`].
    #[error("reasoning provider failure: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered, but the text did not parse into a breakdown.
    /// Carries the raw payload so a human can complete the quote manually.
    #[error("unparseable quote response: {reason}")]
    UnparseableResponse { reason: String, raw: String },

    /// The matched historical part carries no usable reference price, so
    /// there is nothing to anchor the quote to.
    #[error("matched part has no usable reference price")]
    MissingReferencePrice,

    /// A produced breakdown violated a hard constraint.
    #[error("quote validation failed: {0}")]
    Invalid(String),
}
