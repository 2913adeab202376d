//! Gitlore Memory Layer
//!
//! Records, embeddings and storage for knowledge mined from version-control
//! history. The miner produces drafts; this crate turns them into persisted,
//! searchable [`MemoryRecord`]s.
//!
//! ## Features
//!
//! - **Typed records** - factual and episodic memories with immutable audit fields
//! - **Bi-temporal metadata** - when the knowledge became true vs when it was recorded
//! - **Pluggable embeddings** - any [`EmbeddingProvider`] behind a caching [`VectorEngine`]
//! - **Concurrent store** - in-memory index with optional JSON snapshot persistence
//!
//! ## Example
//!
//! ```ignore
//! use gitlore_memory::{MemoryKind, MemoryRecord, MemoryStore, VectorEngine};
//!
//! let engine = VectorEngine::new(provider);
//! let store = MemoryStore::open(&data_dir)?;
//!
//! let record = MemoryRecord::builder()
//!     .kind(MemoryKind::Factual)
//!     .content("fix(parser): handle empty hunks.")
//!     .commit_id("9fceb02")
//!     .embedding(engine.embed("fix(parser): handle empty hunks.").await?)
//!     .build()?;
//!
//! store.put(record).await?;
//! store.save().await?;
//! ```

pub mod embedding;
pub mod error;
pub mod record;
pub mod storage;
pub mod temporal;

// Re-exports for convenience
pub use embedding::{
    cosine_similarity, create_provider, DisabledProvider, EmbeddingConfig, EmbeddingProvider,
    HttpEmbeddingProvider, VectorEngine,
};
pub use error::MemoryError;
pub use record::{
    ExtractionSource, MemoryId, MemoryKind, MemoryRecord, MemoryRecordBuilder,
    MemoryRecordBuilderError, MAX_SOURCE_PATHS,
};
pub use storage::MemoryStore;
pub use temporal::TemporalMetadata;
