//! Error types for commit mining.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and mining commits.
#[derive(Error, Debug)]
pub enum MinerError {
    #[error("Unknown commit: {0}")]
    UnknownCommit(String),

    #[error("Git is not available on this system")]
    GitNotAvailable,

    #[error("Path is not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    #[error("Materialization failed: {0}")]
    Materialization(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Memory error: {0}")]
    Memory(#[from] gitlore_memory::MemoryError),
}

impl MinerError {
    pub fn config(msg: impl Into<String>) -> Self {
        MinerError::Config(msg.into())
    }

    pub fn enrichment(msg: impl Into<String>) -> Self {
        MinerError::Enrichment(msg.into())
    }

    pub fn materialization(msg: impl Into<String>) -> Self {
        MinerError::Materialization(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MinerError>;
