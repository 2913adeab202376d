//! Git log output parsing.

use chrono::{DateTime, Utc};

/// ASCII record separator between fields.
pub const FIELD_SEPARATOR: char = '\u{1e}';
/// ASCII group separator between commits.
pub const COMMIT_SEPARATOR: char = '\u{1d}';

/// Pretty format producing one separator-delimited record per commit.
pub const LOG_FORMAT: &str = concat!(
    "%H", "%x1e", // hash
    "%s", "%x1e", // subject
    "%b", "%x1e", // body
    "%an", "%x1e", // author name
    "%ae", "%x1e", // author email
    "%aI", // author date, strict ISO 8601
    "%x1d"  // commit separator
);

/// Commit metadata from git log.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub hash: String,
    pub subject: String,
    pub body: String,
    pub author_name: String,
    pub author_email: String,
    pub author_date: String,
}

impl CommitInfo {
    /// Subject and body joined the way git stores them.
    pub fn message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.author_date)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Parse output produced with [`LOG_FORMAT`]; malformed records are skipped.
pub fn parse_log_output(output: &str) -> Vec<CommitInfo> {
    output
        .split(COMMIT_SEPARATOR)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .filter_map(|record| {
            let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
            if fields.len() < 6 {
                return None;
            }
            Some(CommitInfo {
                hash: fields[0].trim().to_string(),
                subject: fields[1].to_string(),
                body: fields[2].trim().to_string(),
                author_name: fields[3].to_string(),
                author_email: fields[4].to_string(),
                author_date: fields[5].trim().to_string(),
            })
        })
        .collect()
}
