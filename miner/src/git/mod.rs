//! Git repository access: command execution, log parsing and the
//! git-backed [`CommitSource`](crate::extraction::CommitSource).

mod executor;
mod log;
mod source;

pub use executor::GitExecutor;
pub use log::{parse_log_output, CommitInfo, LOG_FORMAT};
pub use source::GitCommitSource;
