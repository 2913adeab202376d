//! Miner configuration, loaded from an optional JSON file.

use gitlore_memory::EmbeddingConfig;
use serde::Deserialize;
use std::path::Path;

use crate::error::{MinerError, Result};
use crate::extraction::ExtractionConfig;

const CHAT_COMPLETIONS_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Language-model settings for draft enrichment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrichmentConfig {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_retries: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: CHAT_COMPLETIONS_ENDPOINT.to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
            temperature: 0.2,
            max_retries: 2,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MinerConfig {
    pub extraction: ExtractionConfig,
    pub embedding: EmbeddingConfig,
    pub enrichment: EnrichmentConfig,
}

impl MinerConfig {
    /// Read and validate a config file; `None` yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    MinerError::config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                serde_json::from_str::<MinerConfig>(&raw).map_err(|e| {
                    MinerError::config(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            None => MinerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.extraction.validate()?;

        match self.embedding.provider.as_str() {
            "disabled" => {}
            "openai" | "ollama" => {
                if self.embedding.model.is_none() {
                    return Err(MinerError::config(format!(
                        "embedding.model must be specified when provider is '{}'",
                        self.embedding.provider
                    )));
                }
            }
            other => {
                return Err(MinerError::config(format!(
                    "Unknown embedding provider: '{}'. Must be disabled, openai, or ollama",
                    other
                )))
            }
        }

        if self.extraction.enrichment_enabled && self.enrichment.model.trim().is_empty() {
            return Err(MinerError::config(
                "enrichment.model must be set when enrichment is enabled",
            ));
        }
        if !(0.0..=2.0).contains(&self.enrichment.temperature) {
            return Err(MinerError::config("enrichment.temperature must be in [0.0, 2.0]"));
        }
        Ok(())
    }

    pub fn embeddings_enabled(&self) -> bool {
        self.embedding.provider != "disabled"
    }
}
