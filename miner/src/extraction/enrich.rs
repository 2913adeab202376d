//! Optional language-model rewriting of drafts.
//!
//! Retry strategy matches the embedding client: HTTP 429 and 5xx responses
//! and network errors are retried with exponential backoff; other 4xx
//! responses fail immediately.

use async_trait::async_trait;
use std::time::Duration;

use super::draft::MemoryDraft;
use crate::config::EnrichmentConfig;
use crate::error::{MinerError, Result};

const PROMPT_TEMPLATE: &str = "\
Rewrite the following {kind} memory, extracted from a git commit, as one or two \
clear sentences for a developer knowledge base. Keep identifiers, paths and \
numbers exactly as given and do not invent details.

Memory: {content}
Files: {paths}
Confidence: {confidence}

Respond with the rewritten memory only.";

const SYSTEM_PROMPT: &str = "You write concise, factual summaries of source code changes.";

/// Paths included in the prompt.
const PROMPT_PATHS: usize = 3;

/// Rewrites draft content.
#[async_trait]
pub trait TextEnricher: Send + Sync {
    /// Returns the rewritten content, or `None` when the model produced
    /// nothing usable.
    async fn enrich(&self, draft: &MemoryDraft) -> Result<Option<String>>;
}

/// Fill the prompt template for one draft.
pub fn build_prompt(draft: &MemoryDraft) -> String {
    let paths = if draft.source_paths.is_empty() {
        "(none)".to_string()
    } else {
        draft
            .source_paths
            .iter()
            .take(PROMPT_PATHS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    PROMPT_TEMPLATE
        .replace("{kind}", draft.kind.as_str())
        .replace("{paths}", &paths)
        .replace("{confidence}", &format!("{:.2}", draft.confidence))
        .replace("{content}", &draft.content)
}

/// Enricher backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatEnricher {
    endpoint: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ChatEnricher {
    /// The API key is read from `GITLORE_API_KEY` or `OPENAI_API_KEY`; local
    /// servers that need none work without it.
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(MinerError::config("enrichment.model is required"));
        }
        let api_key = std::env::var("GITLORE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            api_key,
            client,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": 200,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        })
    }
}

#[async_trait]
impl TextEnricher for ChatEnricher {
    async fn enrich(&self, draft: &MemoryDraft) -> Result<Option<String>> {
        let body = self.request_body(&build_prompt(draft));
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
                        return Ok(parse_chat_response(&json));
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = MinerError::enrichment(format!(
                        "{} API error {}: {}",
                        self.model, status, body_text
                    ));
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %err,
                            "Enrichment attempt failed"
                        );
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "Enrichment attempt failed");
                    last_err = Some(e.into());
                }
            }
        }

        Err(last_err.unwrap_or_else(|| MinerError::enrichment("Enrichment failed after retries")))
    }
}

/// `{"choices": [{"message": {"content": "..."}}]}` to trimmed text.
fn parse_chat_response(json: &serde_json::Value) -> Option<String> {
    let content = json
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim()
        .trim_matches('"')
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}
