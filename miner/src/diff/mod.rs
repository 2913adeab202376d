//! Unified diff model and parser.

mod parser;
mod types;

pub use parser::{parse_diff, parse_diffs, resolve_change_type, ParseOutcome, ParseWarning};
pub use types::{ChangeType, DiffHunk, DiffLine, DiffStats, LineKind, ParsedDiff};
