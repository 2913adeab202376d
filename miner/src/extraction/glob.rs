//! Critical-path glob matching.
//!
//! `**` matches across directories, `*` within one path segment, `?` any
//! single character. Patterns match the whole path.

use regex::Regex;

/// Translate a glob into an anchored regular expression.
pub fn glob_to_regex(glob: &str) -> String {
    let escaped = regex::escape(glob);
    let body = escaped
        .replace(r"\*\*", "\u{0}")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".")
        .replace('\u{0}', ".*");
    format!("^{}$", body)
}

/// A compiled set of critical-path globs.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Regex>,
}

impl GlobSet {
    /// Compile patterns; a pattern that fails to compile is skipped.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Self {
        let patterns = globs
            .iter()
            .filter_map(|g| {
                let glob = g.as_ref();
                match Regex::new(&glob_to_regex(glob)) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(glob, error = %e, "Ignoring invalid critical-path glob");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_star_crosses_directories() {
        let set = GlobSet::new(&["src/api/**"]);
        assert!(set.is_match("src/api/v1/handler.ts"));
        assert!(set.is_match("src/api/x"));
        assert!(!set.is_match("src/apiv2/handler.ts"));
        assert!(!set.is_match("lib/src/api/x"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let set = GlobSet::new(&["*.log"]);
        assert!(set.is_match("app.log"));
        assert!(!set.is_match("logs/app.log"));
    }

    #[test]
    fn test_question_mark_and_escaping() {
        let set = GlobSet::new(&["v?.json", "a+b/(x).md"]);
        assert!(set.is_match("v1.json"));
        assert!(!set.is_match("v10.json"));
        assert!(!set.is_match("v1xjson"));
        assert!(set.is_match("a+b/(x).md"));
    }

    #[test]
    fn test_any_pattern_matches() {
        let set = GlobSet::new(&["config/**", "**/*.yaml"]);
        assert!(set.is_match("config/app.yaml"));
        assert!(set.is_match("deploy/app.yaml"));
        assert!(!set.is_match("src/main.rs"));
        assert!(GlobSet::new::<&str>(&[]).is_empty());
    }
}
