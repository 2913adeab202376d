//! Conventional-commit classification of commit messages.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Commit types recognized in `type(scope)!: description` headers.
pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "docs", "style", "refactor", "perf", "test", "chore", "build", "ci", "revert",
];

/// Type reported when the header does not follow the grammar.
pub const OTHER_TYPE: &str = "other";

const BREAKING_TOKEN: &str = "BREAKING CHANGE";

/// Classification of a commit message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConventionalCommit {
    #[serde(rename = "type")]
    pub commit_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub description: String,
    pub breaking: bool,
    pub issues: Vec<u64>,
    pub is_valid: bool,
}

fn header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        let types = COMMIT_TYPES.join("|");
        Regex::new(&format!(r"^(?i:({}))(?:\(([^()]+)\))?(!)?:\s*(\S.*)$", types))
            .expect("Invalid regex")
    })
}

fn issue_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)(?:\b(?:fix(?:es|ed)?|close[sd]?|resolve[sd]?)\s+)?#(\d+)\b")
            .expect("Invalid regex")
    })
}

fn casual_prefix_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)^(wip|fix|update|add|remove)\b[\s:\-]*").expect("Invalid regex")
    })
}

/// Classify a full commit message (subject plus optional body).
pub fn parse_commit_message(message: &str) -> ConventionalCommit {
    let first_line = message.lines().next().unwrap_or_default().trim();
    let issues = extract_issues(message);
    let mentions_breaking = message.contains(BREAKING_TOKEN);

    match header_regex().captures(first_line) {
        Some(caps) => ConventionalCommit {
            commit_type: caps[1].to_ascii_lowercase(),
            scope: caps.get(2).map(|m| m.as_str().trim().to_string()),
            description: caps[4].trim().to_string(),
            breaking: caps.get(3).is_some() || mentions_breaking,
            issues,
            is_valid: true,
        },
        None => ConventionalCommit {
            commit_type: OTHER_TYPE.to_string(),
            scope: None,
            description: normalize_description(first_line),
            breaking: mentions_breaking,
            issues,
            is_valid: false,
        },
    }
}

/// Issue numbers referenced anywhere in the message, first mention first.
pub fn extract_issues(message: &str) -> Vec<u64> {
    let mut issues: Vec<u64> = Vec::new();
    for caps in issue_regex().captures_iter(message) {
        if let Ok(number) = caps[1].parse::<u64>() {
            if !issues.contains(&number) {
                issues.push(number);
            }
        }
    }
    issues
}

/// Tidy a free-form subject line into a sentence.
pub fn normalize_description(line: &str) -> String {
    let line = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '+' | '•') || c.is_whitespace());
    let stripped = match casual_prefix_regex().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    let stripped = stripped.trim();

    let mut chars = stripped.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => return String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}
