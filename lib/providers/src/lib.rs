//! # quotx Providers
//!
//! External capabilities for the quotx quoting engine: text embedding and
//! reasoning/completion, behind traits so services take them as injected
//! dependencies rather than reaching for module-level clients.
//!
//! - [`Embedder`] — batchable `texts -> vectors`; [`OpenAiEmbedder`] for
//!   OpenAI-compatible endpoints, [`HashEmbedder`] for deterministic
//!   credential-less operation.
//! - [`Completion`] — blocking `prompt -> text`; [`OpenAiCompletion`].
//! - [`ProviderConfig`] — explicit configuration with one-time credential
//!   resolution; a missing credential is a [`ProviderError::Configuration`]
//!   at construction, not a failure deep inside a request.

pub mod completion;
pub mod config;
pub mod embedder;
pub mod error;

pub use completion::{Completion, OpenAiCompletion};
pub use reqwest::StatusCode;
pub use config::ProviderConfig;
pub use embedder::{Embedder, HashEmbedder, OpenAiEmbedder};
pub use error::ProviderError;
