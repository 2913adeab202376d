//! Gitlore Miner
//!
//! Mines git history into structured memories: parses unified diffs,
//! classifies commit messages, scores the change, and turns each commit into
//! confidence-scored drafts that are materialized as
//! [`gitlore_memory::MemoryRecord`]s.

pub mod analyzer;
pub mod batch;
pub mod config;
pub mod conventional;
pub mod diff;
pub mod error;
pub mod extraction;
pub mod git;
pub mod language;
pub mod observe;

pub use batch::{BatchMiner, BatchResult};
pub use config::{EnrichmentConfig, MinerConfig};
pub use conventional::{parse_commit_message, ConventionalCommit};
pub use diff::{parse_diff, ChangeType, ParsedDiff};
pub use error::{MinerError, Result};
pub use extraction::{
    CommitSnapshot, CommitSource, ExtractionConfig, ExtractionEngine, ExtractionResult,
    MemoryDraft,
};
pub use git::GitCommitSource;
