//! Bi-temporal metadata for memory tracking
//!
//! - **Valid time**: when the knowledge became true (the commit's timestamp)
//! - **Transaction time**: when the record was written to the store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bi-temporal metadata for memory records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalMetadata {
    /// When the knowledge became true in the repository
    pub valid_at: DateTime<Utc>,

    /// When the knowledge ceased to be true (None if still valid)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_at: Option<DateTime<Utc>>,

    /// When this record was created in the store
    pub created_at: DateTime<Utc>,

    /// Commit at which this knowledge was observed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
}

impl TemporalMetadata {
    /// Create metadata for knowledge that is valid as of now
    pub fn new_current() -> Self {
        Self::new_with_valid_at(Utc::now())
    }

    /// Create metadata with a specific valid_at time
    pub fn new_with_valid_at(valid_at: DateTime<Utc>) -> Self {
        Self {
            valid_at,
            invalid_at: None,
            created_at: Utc::now(),
            commit_hash: None,
        }
    }

    /// Attach the commit hash this knowledge was observed at
    pub fn with_commit(mut self, hash: impl Into<String>) -> Self {
        self.commit_hash = Some(hash.into());
        self
    }

    /// True when no invalidation time has passed yet
    pub fn is_current(&self) -> bool {
        match self.invalid_at {
            None => true,
            Some(invalid_at) => invalid_at > Utc::now(),
        }
    }

    /// Check if this knowledge was valid at a specific point in time
    pub fn was_valid_at(&self, time: DateTime<Utc>) -> bool {
        let started = self.valid_at <= time;
        let not_ended = match self.invalid_at {
            None => true,
            Some(invalid_at) => time < invalid_at,
        };
        started && not_ended
    }

    /// Mark the knowledge as no longer valid
    pub fn invalidate(&mut self) {
        self.invalid_at = Some(Utc::now());
    }

    pub fn is_at_commit(&self, hash: &str) -> bool {
        self.commit_hash
            .as_deref()
            .map(|h| h.starts_with(hash) || hash.starts_with(h))
            .unwrap_or(false)
    }
}

impl Default for TemporalMetadata {
    fn default() -> Self {
        Self::new_current()
    }
}
