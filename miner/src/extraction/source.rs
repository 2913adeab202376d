//! Commit loading capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::diff::{parse_diff, ChangeType, ParseWarning, ParsedDiff};
use crate::error::{MinerError, Result};

/// One changed file as seen by extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: String,
    pub change_type: ChangeType,
    pub added: usize,
    pub removed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub complexity: f64,
}

impl ChangedFile {
    pub fn from_parsed(diff: &ParsedDiff) -> Self {
        Self {
            path: diff.path().to_string(),
            change_type: diff.change_type,
            added: diff.stats.added,
            removed: diff.stats.removed,
            language: diff.language.clone(),
            complexity: diff.complexity,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.added + self.removed
    }
}

/// Everything extraction needs to know about one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSnapshot {
    pub id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub files: Vec<ChangedFile>,
    /// Raw patch text, when the source has it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl CommitSnapshot {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            author: None,
            timestamp: None,
            files: Vec::new(),
            diff: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_files(mut self, files: Vec<ChangedFile>) -> Self {
        self.files = files;
        self
    }

    /// Populate `files` by parsing `diff_text`; returns parser warnings.
    pub fn with_diff(mut self, diff_text: impl Into<String>) -> (Self, Vec<ParseWarning>) {
        let text = diff_text.into();
        let outcome = parse_diff(&text);
        self.files = outcome.diffs.iter().map(ChangedFile::from_parsed).collect();
        self.diff = Some(text);
        (self, outcome.warnings)
    }

    /// First line of the message, for logs.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub fn short_id(&self) -> &str {
        self.id.get(..7).unwrap_or(&self.id)
    }
}

/// Loads commit metadata and changed files from storage.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Fails with [`MinerError::UnknownCommit`] when the commit does not exist.
    async fn load(&self, commit_id: &str) -> Result<CommitSnapshot>;
}

/// Commit source over a fixed in-memory set of snapshots.
#[derive(Debug, Default, Clone)]
pub struct StaticCommitSource {
    commits: HashMap<String, CommitSnapshot>,
}

impl StaticCommitSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, snapshot: CommitSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    pub fn insert(&mut self, snapshot: CommitSnapshot) {
        self.commits.insert(snapshot.id.clone(), snapshot);
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[async_trait]
impl CommitSource for StaticCommitSource {
    async fn load(&self, commit_id: &str) -> Result<CommitSnapshot> {
        if let Some(snapshot) = self.commits.get(commit_id) {
            return Ok(snapshot.clone());
        }

        // Abbreviated ids resolve when unambiguous
        let mut matches = self
            .commits
            .values()
            .filter(|s| !commit_id.is_empty() && s.id.starts_with(commit_id));
        match (matches.next(), matches.next()) {
            (Some(snapshot), None) => Ok(snapshot.clone()),
            _ => Err(MinerError::UnknownCommit(commit_id.to_string())),
        }
    }
}
