//! Commit source backed by a local git repository.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::executor::GitExecutor;
use crate::error::{MinerError, Result};
use crate::extraction::{CommitSnapshot, CommitSource};

/// Loads commits by shelling out to git on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct GitCommitSource {
    executor: Arc<GitExecutor>,
}

impl GitCommitSource {
    pub fn open(repo_path: &Path) -> Result<Self> {
        Ok(Self {
            executor: Arc::new(GitExecutor::new(repo_path)?),
        })
    }

    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    /// Newest-first hashes reachable from HEAD.
    pub async fn recent_commits(&self, limit: usize) -> Result<Vec<String>> {
        let executor = Arc::clone(&self.executor);
        tokio::task::spawn_blocking(move || executor.log_hashes(None, Some(limit)))
            .await
            .map_err(|e| MinerError::CommandFailed(format!("git task failed: {}", e)))?
    }
}

fn load_blocking(executor: &GitExecutor, rev: &str) -> Result<CommitSnapshot> {
    let hash = executor.resolve(rev)?;
    let info = executor.show_info(&hash)?;
    let patch = executor.show_patch(&hash)?;

    let mut snapshot =
        CommitSnapshot::new(hash, info.message()).with_author(info.author_name.clone());
    if let Some(at) = info.timestamp() {
        snapshot = snapshot.with_timestamp(at);
    }

    let (snapshot, warnings) = snapshot.with_diff(patch);
    for warning in warnings {
        tracing::warn!(
            commit = snapshot.short_id(),
            line = warning.line,
            "Skipped malformed diff section: {}",
            warning.message
        );
    }
    Ok(snapshot)
}

#[async_trait]
impl CommitSource for GitCommitSource {
    async fn load(&self, commit_id: &str) -> Result<CommitSnapshot> {
        let executor = Arc::clone(&self.executor);
        let rev = commit_id.to_string();
        tokio::task::spawn_blocking(move || load_blocking(&executor, &rev))
            .await
            .map_err(|e| MinerError::CommandFailed(format!("git task failed: {}", e)))?
    }
}
