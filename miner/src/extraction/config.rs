//! Extraction thresholds and limits.

use serde::{Deserialize, Serialize};

use crate::error::{MinerError, Result};

/// Configuration for commit extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionConfig {
    /// Minimum added + removed lines for a diff-based memory.
    pub diff_threshold: usize,
    /// Drafts beyond this count are dropped, in construction order.
    pub max_memories_per_commit: usize,
    /// Paths that always produce a diff-based memory when touched.
    pub critical_path_globs: Vec<String>,
    /// Memory content is truncated to this many characters.
    pub max_content_length: usize,
    /// Whether drafts are rewritten by a language model.
    pub enrichment_enabled: bool,
    /// Reserved for downstream filtering.
    pub confidence_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            diff_threshold: 30,
            max_memories_per_commit: 5,
            critical_path_globs: vec![
                "src/auth/**".to_string(),
                "src/api/**".to_string(),
                "migrations/**".to_string(),
                "config/**".to_string(),
                "schema/**".to_string(),
            ],
            max_content_length: 500,
            enrichment_enabled: false,
            confidence_threshold: 0.5,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_memories_per_commit == 0 {
            return Err(MinerError::config("maxMemoriesPerCommit must be at least 1"));
        }
        if self.max_content_length < 16 {
            return Err(MinerError::config("maxContentLength must be at least 16"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MinerError::config(format!(
                "confidenceThreshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.diff_threshold, 30);
        assert_eq!(config.max_memories_per_commit, 5);
        assert_eq!(config.max_content_length, 500);
        assert!(!config.enrichment_enabled);
        assert!(config.critical_path_globs.contains(&"migrations/**".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"diffThreshold": 10, "enrichmentEnabled": true}"#).unwrap();
        assert_eq!(config.diff_threshold, 10);
        assert!(config.enrichment_enabled);
        assert_eq!(config.max_memories_per_commit, 5);
        assert_eq!(config.critical_path_globs.len(), 5);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_cap = ExtractionConfig {
            max_memories_per_commit: 0,
            ..Default::default()
        };
        assert!(matches!(zero_cap.validate(), Err(MinerError::Config(_))));

        let tiny = ExtractionConfig {
            max_content_length: 8,
            ..Default::default()
        };
        assert!(tiny.validate().is_err());

        let threshold = ExtractionConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(threshold.validate().is_err());
    }
}
