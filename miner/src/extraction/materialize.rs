//! Turning drafts into stored memory records.

use async_trait::async_trait;
use gitlore_memory::{MemoryRecord, MemoryStore, TemporalMetadata, VectorEngine};
use std::sync::Arc;

use super::draft::MemoryDraft;
use super::source::CommitSnapshot;
use crate::error::{MinerError, Result};

/// Tag carried by every record produced from git history.
pub const GIT_MINED_TAG: &str = "git-mined";

/// Embeds and persists accepted drafts.
#[async_trait]
pub trait RecordMaterializer: Send + Sync {
    /// Store the draft and return the new record's id.
    async fn materialize(&self, draft: MemoryDraft, commit: &CommitSnapshot) -> Result<String>;
}

/// Materializer writing to a [`MemoryStore`].
///
/// Without a vector engine records are stored unembedded and are then
/// invisible to semantic search.
pub struct StoreMaterializer {
    store: Arc<MemoryStore>,
    vectors: Option<Arc<VectorEngine>>,
}

impl StoreMaterializer {
    pub fn new(store: Arc<MemoryStore>, vectors: Arc<VectorEngine>) -> Self {
        Self {
            store,
            vectors: Some(vectors),
        }
    }

    pub fn without_embeddings(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            vectors: None,
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

/// Build the persisted record for a draft.
pub fn build_record(
    draft: MemoryDraft,
    commit: &CommitSnapshot,
    embedding: Option<Vec<f32>>,
) -> Result<MemoryRecord> {
    let temporal = match commit.timestamp {
        Some(at) => TemporalMetadata::new_with_valid_at(at),
        None => TemporalMetadata::new_current(),
    }
    .with_commit(&commit.id);

    let mut builder = MemoryRecord::builder()
        .kind(draft.kind)
        .content(draft.content)
        .metadata(draft.metadata)
        .extracted_from(draft.extracted_from)
        .confidence(draft.confidence)
        .tag(GIT_MINED_TAG)
        .tag(draft.kind.as_str())
        .temporal(temporal)
        .source_paths(draft.source_paths)
        .commit_ids(draft.commit_ids);
    if let Some(embedding) = embedding {
        builder = builder.embedding(embedding);
    }

    builder
        .build()
        .map_err(|e| MinerError::materialization(format!("Failed to build record: {}", e)))
}

#[async_trait]
impl RecordMaterializer for StoreMaterializer {
    async fn materialize(&self, draft: MemoryDraft, commit: &CommitSnapshot) -> Result<String> {
        let embedding = match &self.vectors {
            Some(vectors) => Some(vectors.embed(&draft.content).await?),
            None => None,
        };
        let record = build_record(draft, commit, embedding)?;
        Ok(self.store.put(record).await?)
    }
}
