//! Logging wrappers applied at external call boundaries.
//!
//! Extraction code stays free of log statements; callers wrap each commit
//! load, enrichment, embedding and persistence call in [`observe`] and each
//! whole-commit extraction in [`observe_extraction`].

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use crate::extraction::ExtractionResult;

/// Await `fut`, logging its duration and outcome. Success is logged at
/// debug level, failure at warn.
pub async fn observe<T, E, F>(operation: &'static str, subject: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    let result = fut.await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(_) => tracing::debug!(operation, subject, elapsed_ms, "ok"),
        Err(e) => tracing::warn!(operation, subject, elapsed_ms, error = %e, "failed"),
    }
    result
}

/// Like [`observe`] for a whole commit, logging the extraction summary at
/// info level.
pub async fn observe_extraction<E, F>(commit_id: &str, fut: F) -> Result<ExtractionResult, E>
where
    F: Future<Output = Result<ExtractionResult, E>>,
    E: Display,
{
    let result = fut.await;

    match &result {
        Ok(r) => tracing::info!(
            commit = commit_id,
            message_drafts = r.stats.message_drafts,
            diff_drafts = r.stats.diff_drafts,
            created = r.stats.total_created,
            enriched = r.stats.enriched_count,
            elapsed_ms = r.stats.elapsed_ms,
            "Extracted commit"
        ),
        Err(e) => tracing::error!(commit = commit_id, error = %e, "Extraction failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_observe_passes_results_through() {
        let ok: Result<u32, String> = observe("load", "abc", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<u32, String> =
            observe("load", "abc", async { Err("boom".to_string()) }).await;
        assert_eq!(err, Err("boom".to_string()));
    }
}
