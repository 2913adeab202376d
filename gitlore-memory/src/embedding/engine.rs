//! Vector embedding engine
//!
//! High-level API for generating and caching embeddings.

use super::EmbeddingProvider;
use crate::error::{MemoryError, Result};
use dashmap::DashMap;
use std::sync::Arc;

/// Vector embedding engine with caching
///
/// Wraps an [`EmbeddingProvider`] with a DashMap cache so identical drafts
/// mined from related commits are embedded once.
pub struct VectorEngine {
    provider: Arc<dyn EmbeddingProvider>,
    cache: DashMap<String, Vec<f32>>,
}

impl VectorEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        log::info!(
            "VectorEngine ready (model: {}, {}d)",
            provider.model_name(),
            provider.dims()
        );

        Self {
            provider,
            cache: DashMap::new(),
        }
    }

    /// Generate embedding with caching
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        let embedding = self
            .provider
            .embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::embedding("Empty embedding response"))?;

        self.cache.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Batch embed with caching
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = texts
            .iter()
            .map(|text| self.cache.get(*text).map(|v| v.clone()))
            .collect();

        let uncached: Vec<(usize, String)> = results
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| (i, texts[i].to_string()))
            .collect();

        if uncached.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        let uncached_texts: Vec<String> = uncached.iter().map(|(_, t)| t.clone()).collect();
        let new_embeddings = self.provider.embed_batch(&uncached_texts).await?;
        if new_embeddings.len() != uncached_texts.len() {
            return Err(MemoryError::embedding(format!(
                "Provider returned {} vectors for {} texts",
                new_embeddings.len(),
                uncached_texts.len()
            )));
        }

        for ((idx, text), emb) in uncached.into_iter().zip(new_embeddings) {
            self.cache.insert(text, emb.clone());
            results[idx] = Some(emb);
        }

        Ok(results.into_iter().flatten().collect())
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub fn dimension(&self) -> usize {
        self.provider.dims()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as [len, vowel count] and counts provider calls.
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn model_name(&self) -> &str {
            "counting"
        }

        fn dims(&self) -> usize {
            2
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let vowels = t.chars().filter(|c| "aeiou".contains(*c)).count();
                    vec![t.len() as f32, vowels as f32]
                })
                .collect())
        }
    }

    fn engine() -> (Arc<CountingProvider>, VectorEngine) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let engine = VectorEngine::new(provider.clone());
        (provider, engine)
    }

    #[tokio::test]
    async fn test_embed_is_cached() {
        let (provider, engine) = engine();

        let first = engine.embed("hello").await.unwrap();
        let second = engine.embed("hello").await.unwrap();

        assert_eq!(first, vec![5.0, 2.0]);
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_embed_batch_only_sends_uncached() {
        let (provider, engine) = engine();
        engine.embed("alpha").await.unwrap();

        let vectors = engine.embed_batch(&["alpha", "beta", "gamma"]).await.unwrap();

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[1], vec![4.0, 2.0]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(engine.cache_size(), 3);

        engine.clear_cache();
        assert_eq!(engine.cache_size(), 0);
    }
}
