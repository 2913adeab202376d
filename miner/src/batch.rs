//! Bounded-concurrency extraction over many commits.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::extraction::{ExtractionEngine, ExtractionResult};

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub commits_processed: usize,
    pub memories_created: usize,
    pub memory_ids: Vec<String>,
    pub results: Vec<ExtractionResult>,
    /// One entry per commit that could not be extracted
    pub warnings: Vec<String>,
}

/// Runs the extraction engine over a list of commits.
pub struct BatchMiner {
    engine: Arc<ExtractionEngine>,
}

impl BatchMiner {
    pub fn new(engine: Arc<ExtractionEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<ExtractionEngine> {
        &self.engine
    }

    /// Extract every commit with at most `fan_out` in flight.
    ///
    /// Results keep the order of `commit_ids`. A commit that fails is
    /// reported in `warnings` and does not stop the batch.
    pub async fn mine(&self, commit_ids: &[String], fan_out: usize) -> BatchResult {
        let semaphore = Arc::new(Semaphore::new(fan_out.max(1)));
        let mut handles = Vec::with_capacity(commit_ids.len());

        for commit_id in commit_ids {
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);
            let task_id = commit_id.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                engine.extract_commit(&task_id).await
            });
            handles.push((commit_id, handle));
        }

        let mut batch = BatchResult::default();
        for (commit_id, handle) in handles {
            match handle.await {
                Ok(Ok(result)) => {
                    batch.commits_processed += 1;
                    batch.memories_created += result.memory_ids.len();
                    batch.memory_ids.extend(result.memory_ids.iter().cloned());
                    batch.results.push(result);
                }
                Ok(Err(e)) => batch.warnings.push(format!("{}: {}", commit_id, e)),
                Err(e) => batch.warnings.push(format!("{}: task failed: {}", commit_id, e)),
            }
        }

        tracing::info!(
            commits = batch.commits_processed,
            memories = batch.memories_created,
            warnings = batch.warnings.len(),
            "Batch mining complete"
        );
        batch
    }
}
