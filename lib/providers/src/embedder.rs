//! Embedding capability and its implementations.
//!
//! The embedder is injected into the retrieval service at construction; all
//! call sites batch, issuing a batch-of-one for single queries.

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use quotx_core::Vector;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Default dimension for the offline hash embedder.
pub const DEFAULT_HASH_DIM: usize = 64;

/// Converts texts into fixed-length vectors.
///
/// Contract: deterministic for a given provider/model, same dimensionality
/// across calls. Transient call failures surface as retryable
/// [`ProviderError`]s; the embedder itself never retries.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError>;
}

/// Blocking client for OpenAI-compatible `/embeddings` endpoints.
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
}

impl OpenAiEmbedder {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| ProviderError::Configuration("invalid API key header".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.embed_model.clone(),
            dimensions: None,
        })
    }

    /// Request reduced-dimension embeddings where the model supports it.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = texts.len(), model = %self.model, "requesting embeddings");
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };

        let response = self.client.post(&self.endpoint).json(&request).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ProviderError::Status { status, body });
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "got {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        Ok(parsed
            .data
            .into_iter()
            .map(|entry| Vector::new(entry.embedding))
            .collect())
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// Deterministic offline embedder hashing character trigrams into a
/// fixed-dimension normalized vector.
///
/// Needs no credential and no network, so it backs tests and credential-less
/// runs. Lexically similar composed part texts land close together, which is
/// sufficient for structured part retrieval at this corpus scale.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed_one(&self, text: &str) -> Vector {
        let mut components = vec![0.0f32; self.dim];
        let padded = format!("  {}  ", text.to_lowercase());
        let chars: Vec<char> = padded.chars().collect();

        for window in chars.windows(3) {
            let trigram: String = window.iter().collect();
            components[self.bucket(&trigram)] += 1.0;
        }

        let mut vector = Vector::new(components);
        vector.normalize();
        vector
    }

    fn bucket(&self, trigram: &str) -> usize {
        let digest = Sha256::digest(trigram.as_bytes());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(raw) % self.dim as u64) as usize
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(embedder: &HashEmbedder, text: &str) -> Vector {
        embedder.embed(&[text.to_string()]).unwrap().remove(0)
    }

    #[test]
    fn test_same_text_same_vector() {
        let embedder = HashEmbedder::default();
        let v1 = embed(&embedder, "Material: Aluminum | Size: 100x50x5");
        let v2 = embed(&embedder, "Material: Aluminum | Size: 100x50x5");
        assert_eq!(v1.as_slice(), v2.as_slice());
    }

    #[test]
    fn test_fixed_dimension_and_unit_norm() {
        let embedder = HashEmbedder::new(32);
        let vectors = embedder
            .embed(&["short".to_string(), "a much longer part description".to_string()])
            .unwrap();

        for v in &vectors {
            assert_eq!(v.dim(), 32);
            assert!((v.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_similar_texts_are_closer_than_dissimilar() {
        let embedder = HashEmbedder::default();
        let bracket = embed(&embedder, "Aluminum bracket, 100x50x5 mm, drilling, anodized");
        let bracket_variant = embed(&embedder, "Aluminum bracket, 100x50x6 mm, drilling, anodized");
        let gear = embed(&embedder, "Steel gear, 30x30x10 mm, milling, painted");

        let near = bracket.cosine_similarity(&bracket_variant);
        let far = bracket.cosine_similarity(&gear);
        assert!(
            near > far,
            "expected variant ({near}) closer than gear ({far})"
        );
    }

    #[test]
    fn test_empty_batch() {
        let embedder = HashEmbedder::default();
        assert!(embedder.embed(&[]).unwrap().is_empty());
    }
}
