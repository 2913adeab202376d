//! HTTP embedding providers (OpenAI and Ollama).
//!
//! Retry strategy for both backends:
//! - HTTP 429 and 5xx: retry with exponential backoff (1s, 2s, 4s, ... capped at 32s)
//! - other 4xx: fail immediately
//! - network errors: retry

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::EmbeddingProvider;
use crate::error::{MemoryError, Result};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
const OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/embed";

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// `"disabled"`, `"openai"` or `"ollama"`
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Overrides the provider's default URL
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_provider() -> String {
    "disabled".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Instantiate the provider named by `config.provider`.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "openai" | "ollama" => Ok(Arc::new(HttpEmbeddingProvider::new(config)?)),
        other => Err(MemoryError::config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

/// Provider used when embeddings are not configured; every call fails.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    fn dims(&self) -> usize {
        0
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(MemoryError::embedding("Embedding provider is disabled"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Backend {
    OpenAi,
    Ollama,
}

/// Embedding provider backed by an OpenAI- or Ollama-compatible HTTP API.
pub struct HttpEmbeddingProvider {
    backend: Backend,
    model: String,
    dims: usize,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
    client: reqwest::Client,
}

impl HttpEmbeddingProvider {
    /// Build a provider from configuration.
    ///
    /// OpenAI requires `model`, `dims` and an API key in `GITLORE_API_KEY`
    /// or `OPENAI_API_KEY`. Ollama requires `model`.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let backend = match config.provider.as_str() {
            "openai" => Backend::OpenAi,
            "ollama" => Backend::Ollama,
            other => {
                return Err(MemoryError::config(format!(
                    "Not an HTTP embedding provider: {}",
                    other
                )))
            }
        };

        let model = config
            .model
            .clone()
            .ok_or_else(|| MemoryError::config("embedding.model is required"))?;

        let (dims, endpoint, api_key) = match backend {
            Backend::OpenAi => {
                let dims = config
                    .dims
                    .ok_or_else(|| MemoryError::config("embedding.dims is required for OpenAI"))?;
                let api_key = std::env::var("GITLORE_API_KEY")
                    .or_else(|_| std::env::var("OPENAI_API_KEY"))
                    .map_err(|_| MemoryError::config("GITLORE_API_KEY or OPENAI_API_KEY not set"))?;
                let endpoint = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| OPENAI_ENDPOINT.to_string());
                (dims, endpoint, Some(api_key))
            }
            Backend::Ollama => {
                let endpoint = config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| OLLAMA_ENDPOINT.to_string());
                (config.dims.unwrap_or(0), endpoint, None)
            }
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            backend,
            model,
            dims,
            endpoint,
            api_key,
            max_retries: config.max_retries,
            client,
        })
    }

    fn request_body(&self, texts: &[String]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "input": texts,
        })
    }

    fn parse_response(&self, json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
        match self.backend {
            Backend::OpenAi => parse_openai_response(json),
            Backend::Ollama => parse_ollama_response(json),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let body = self.request_body(texts);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return self.parse_response(&json);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = MemoryError::embedding(format!(
                        "{} API error {}: {}",
                        self.model, status, body_text
                    ));
                    if status.as_u16() == 429 || status.is_server_error() {
                        log::warn!("Embedding attempt {} failed: {}", attempt + 1, err);
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    log::warn!("Embedding attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or_else(|| MemoryError::embedding("Embedding failed after retries")))
    }
}

fn parse_vector(value: &serde_json::Value) -> Result<Vec<f32>> {
    value
        .as_array()
        .ok_or_else(|| MemoryError::embedding("Embedding is not an array"))?
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| MemoryError::embedding("Embedding value is not a number"))
        })
        .collect()
}

/// `{"data": [{"index": 0, "embedding": [...]}, ...]}`, possibly out of order.
fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json["data"]
        .as_array()
        .ok_or_else(|| MemoryError::embedding("Missing 'data' in OpenAI response"))?;

    let mut indexed = data
        .iter()
        .map(|item| {
            let index = item["index"].as_u64().unwrap_or(0) as usize;
            Ok((index, parse_vector(&item["embedding"])?))
        })
        .collect::<Result<Vec<_>>>()?;
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

/// `{"embeddings": [[...], ...]}`
fn parse_ollama_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    json["embeddings"]
        .as_array()
        .ok_or_else(|| MemoryError::embedding("Missing 'embeddings' in Ollama response"))?
        .iter()
        .map(parse_vector)
        .collect()
}
