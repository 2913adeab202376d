//! Memory drafts: candidate records awaiting embedding and persistence.

use gitlore_memory::{ExtractionSource, MemoryKind, MAX_SOURCE_PATHS};
use serde::Serialize;
use serde_json::{Map, Value};

/// Confidence after enrichment never exceeds this.
pub const MAX_ENRICHED_CONFIDENCE: f32 = 0.95;
/// Confidence gained by a successful enrichment.
pub const ENRICHMENT_BONUS: f32 = 0.1;

const ELLIPSIS: &str = "...";

/// A candidate memory built from one commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDraft {
    pub kind: MemoryKind,
    pub content: String,
    pub metadata: Map<String, Value>,
    pub source_paths: Vec<String>,
    pub commit_ids: Vec<String>,
    pub extracted_from: ExtractionSource,
    pub confidence: f32,
}

impl MemoryDraft {
    pub fn new(
        kind: MemoryKind,
        extracted_from: ExtractionSource,
        content: String,
        confidence: f32,
    ) -> Self {
        Self {
            kind,
            content,
            metadata: Map::new(),
            source_paths: Vec::new(),
            commit_ids: Vec::new(),
            extracted_from,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn with_commit(mut self, commit_id: impl Into<String>) -> Self {
        let id = commit_id.into();
        if !self.commit_ids.contains(&id) {
            self.commit_ids.push(id);
        }
        self
    }

    /// Keep the first [`MAX_SOURCE_PATHS`] unique paths.
    pub fn with_source_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            if self.source_paths.len() >= MAX_SOURCE_PATHS {
                break;
            }
            let path = path.into();
            if !self.source_paths.contains(&path) {
                self.source_paths.push(path);
            }
        }
        self
    }

    /// Replace the content with an enriched rewrite and raise confidence.
    pub fn apply_enrichment(&mut self, content: String, max_length: usize) {
        self.content = truncate_content(&content, max_length);
        self.confidence = (self.confidence + ENRICHMENT_BONUS)
            .min(MAX_ENRICHED_CONFIDENCE)
            .max(self.confidence);
        self.metadata.insert("enriched".to_string(), Value::Bool(true));
    }

    pub fn is_enriched(&self) -> bool {
        self.metadata.get("enriched") == Some(&Value::Bool(true))
    }
}

/// Shorten `content` to at most `max_length` characters, ending in `...`
/// when cut. Cuts fall on character boundaries.
pub fn truncate_content(content: &str, max_length: usize) -> String {
    if content.chars().count() <= max_length {
        return content.to_string();
    }
    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut out: String = content.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}
