//! Memory record types and builders
//!
//! A [`MemoryRecord`] is the persisted form of a draft produced by the
//! miner: content plus embedding, with the commits and paths it came from
//! kept as audit fields that cannot change once the record is built.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::temporal::TemporalMetadata;

/// Maximum number of source paths kept on a record
pub const MAX_SOURCE_PATHS: usize = 10;

/// Unique identifier for memory records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random MemoryId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MemoryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// What kind of knowledge a memory holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    /// A stated fact, e.g. the intent recorded in a commit message
    Factual,
    /// Something that happened, e.g. a summary of the change itself
    Episodic,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Factual => "factual",
            MemoryKind::Episodic => "episodic",
        }
    }
}

/// Which part of a commit a memory was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Message,
    Diff,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Message => "message",
            ExtractionSource::Diff => "diff",
        }
    }
}

/// A persisted memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Unique identifier
    pub id: MemoryId,
    /// Factual or episodic
    pub kind: MemoryKind,
    /// Searchable text
    pub content: String,
    /// Free-form structured metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Where in the commit this was extracted from
    pub extracted_from: ExtractionSource,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
    /// Embedding vector for semantic search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Searchable tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Temporal metadata (bi-temporal)
    pub temporal: TemporalMetadata,
    #[serde(default)]
    source_paths: Vec<String>,
    #[serde(default)]
    commit_ids: Vec<String>,
}

impl MemoryRecord {
    /// Create a new builder for MemoryRecord
    pub fn builder() -> MemoryRecordBuilder {
        MemoryRecordBuilder::new()
    }

    /// Files the memory was derived from (audit field)
    pub fn source_paths(&self) -> &[String] {
        &self.source_paths
    }

    /// Commits the memory was derived from (audit field)
    pub fn commit_ids(&self) -> &[String] {
        &self.commit_ids
    }

    /// Check if this memory is currently valid
    pub fn is_current(&self) -> bool {
        self.temporal.is_current()
    }

    /// Get the searchable text for this memory
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.content,
            self.source_paths.join(" "),
            self.tags.join(" ")
        )
    }
}

/// Builder for MemoryRecord with fluent API
#[derive(Debug, Default)]
pub struct MemoryRecordBuilder {
    id: Option<MemoryId>,
    kind: Option<MemoryKind>,
    content: Option<String>,
    metadata: Map<String, Value>,
    extracted_from: Option<ExtractionSource>,
    confidence: f32,
    embedding: Option<Vec<f32>>,
    tags: Vec<String>,
    temporal: Option<TemporalMetadata>,
    source_paths: Vec<String>,
    commit_ids: Vec<String>,
}

impl MemoryRecordBuilder {
    pub fn new() -> Self {
        Self {
            confidence: 1.0,
            ..Default::default()
        }
    }

    /// Set the memory ID (auto-generated if not set)
    pub fn id(mut self, id: MemoryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn kind(mut self, kind: MemoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replace the whole metadata map
    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Insert a single metadata entry
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn extracted_from(mut self, source: ExtractionSource) -> Self {
        self.extracted_from = Some(source);
        self
    }

    /// Set confidence score
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set embedding vector
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set temporal metadata
    pub fn temporal(mut self, temporal: TemporalMetadata) -> Self {
        self.temporal = Some(temporal);
        self
    }

    /// Add a source path; duplicates and paths beyond the cap are ignored
    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if self.source_paths.len() < MAX_SOURCE_PATHS && !self.source_paths.contains(&path) {
            self.source_paths.push(path);
        }
        self
    }

    pub fn source_paths<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        paths.into_iter().fold(self, |b, p| b.source_path(p))
    }

    /// Add a commit id; duplicates are ignored
    pub fn commit_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.commit_ids.contains(&id) {
            self.commit_ids.push(id);
        }
        self
    }

    pub fn commit_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().fold(self, |b, id| b.commit_id(id))
    }

    /// Build the MemoryRecord
    pub fn build(self) -> Result<MemoryRecord, MemoryRecordBuilderError> {
        let kind = self.kind.ok_or(MemoryRecordBuilderError::MissingKind)?;
        let content = self.content.ok_or(MemoryRecordBuilderError::MissingContent)?;
        if content.trim().is_empty() {
            return Err(MemoryRecordBuilderError::EmptyContent);
        }
        let extracted_from = self
            .extracted_from
            .ok_or(MemoryRecordBuilderError::MissingSource)?;

        Ok(MemoryRecord {
            id: self.id.unwrap_or_default(),
            kind,
            content,
            metadata: self.metadata,
            extracted_from,
            confidence: self.confidence,
            embedding: self.embedding,
            tags: self.tags,
            temporal: self.temporal.unwrap_or_default(),
            source_paths: self.source_paths,
            commit_ids: self.commit_ids,
        })
    }
}

/// Errors that can occur when building a MemoryRecord
#[derive(Debug, thiserror::Error)]
pub enum MemoryRecordBuilderError {
    #[error("Missing required field: kind")]
    MissingKind,
    #[error("Missing required field: content")]
    MissingContent,
    #[error("Content must not be empty")]
    EmptyContent,
    #[error("Missing required field: extracted_from")]
    MissingSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> MemoryRecordBuilder {
        MemoryRecord::builder()
            .kind(MemoryKind::Factual)
            .content("feat(auth): add PKCE to OAuth flow.")
            .extracted_from(ExtractionSource::Message)
    }

    #[test]
    fn test_memory_id_parse() {
        let id = MemoryId::new();
        let parsed: MemoryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_ne!(id, MemoryId::new());
    }

    #[test]
    fn test_builder_factual() {
        let record = base()
            .commit_id("abc1234")
            .source_path("src/auth/oauth.rs")
            .metadata_entry("breaking", true)
            .tag("git-mined")
            .confidence(0.8)
            .build()
            .unwrap();

        assert_eq!(record.kind, MemoryKind::Factual);
        assert_eq!(record.commit_ids(), ["abc1234".to_string()]);
        assert_eq!(record.source_paths(), ["src/auth/oauth.rs".to_string()]);
        assert_eq!(record.metadata["breaking"], Value::Bool(true));
        assert_eq!(record.confidence, 0.8);
    }

    #[test]
    fn test_source_paths_unique_and_capped() {
        let paths: Vec<String> = (0..15).map(|i| format!("src/file_{}.rs", i % 12)).collect();
        let record = base().source_paths(paths).build().unwrap();

        assert_eq!(record.source_paths().len(), MAX_SOURCE_PATHS);
        assert_eq!(record.source_paths()[0], "src/file_0.rs");
        assert_eq!(record.source_paths()[9], "src/file_9.rs");
    }

    #[test]
    fn test_confidence_clamped() {
        let record = base().confidence(1.7).build().unwrap();
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn test_builder_missing_required() {
        let result = MemoryRecord::builder()
            .content("Content")
            .extracted_from(ExtractionSource::Diff)
            .build();
        assert!(matches!(result, Err(MemoryRecordBuilderError::MissingKind)));

        let result = MemoryRecord::builder()
            .kind(MemoryKind::Episodic)
            .content("   ")
            .extracted_from(ExtractionSource::Diff)
            .build();
        assert!(matches!(result, Err(MemoryRecordBuilderError::EmptyContent)));
    }

    #[test]
    fn test_searchable_text() {
        let record = base()
            .source_path("src/auth/oauth.rs")
            .tag("factual")
            .build()
            .unwrap();

        let text = record.searchable_text();
        assert!(text.contains("PKCE"));
        assert!(text.contains("src/auth/oauth.rs"));
        assert!(text.contains("factual"));
    }

    #[test]
    fn test_record_serialization() {
        let record = base().commit_id("abc1234").build().unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "factual");
        assert_eq!(json["extractedFrom"], "message");
        assert_eq!(json["commitIds"][0], "abc1234");

        let restored: MemoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored.id, record.id);
        assert_eq!(restored.commit_ids(), record.commit_ids());
    }
}
