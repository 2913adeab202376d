//! Commit-to-memory extraction.
//!
//! The [`ExtractionEngine`] pulls a commit from a [`CommitSource`], builds
//! [`MemoryDraft`]s from its message and diff, optionally rewrites them with
//! a [`TextEnricher`], and hands the survivors to a [`RecordMaterializer`].

mod config;
mod draft;
mod engine;
mod enrich;
mod glob;
mod materialize;
mod source;

pub use config::ExtractionConfig;
pub use draft::{truncate_content, MemoryDraft, ENRICHMENT_BONUS, MAX_ENRICHED_CONFIDENCE};
pub use engine::{
    cap_drafts, ExtractionEngine, ExtractionResult, ExtractionStats, DIFF_CONFIDENCE,
    FREEFORM_MESSAGE_CONFIDENCE, VALID_MESSAGE_CONFIDENCE,
};
pub use enrich::{build_prompt, ChatEnricher, TextEnricher};
pub use glob::{glob_to_regex, GlobSet};
pub use materialize::{build_record, RecordMaterializer, StoreMaterializer, GIT_MINED_TAG};
pub use source::{ChangedFile, CommitSnapshot, CommitSource, StaticCommitSource};
