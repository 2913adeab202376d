//! Diff analysis: aggregate statistics, complexity scoring, pattern and
//! risk detection, and human-readable snippets.
//!
//! Everything here is a pure function over parsed diffs.

use crate::diff::{ChangeType, LineKind, ParsedDiff};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::sync::OnceLock;

/// Files with more added lines than this are hotspots.
pub const HOTSPOT_ADDED_LINES: usize = 500;
/// Files with more removed lines than this are flagged as risky.
pub const LARGE_REMOVAL_LINES: usize = 200;

/// Totals over a batch of parsed diffs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffAggregate {
    pub files_changed: usize,
    pub added: usize,
    pub removed: usize,
    pub by_change_type: BTreeMap<ChangeType, usize>,
    pub languages: BTreeMap<String, usize>,
    pub total_complexity: f64,
}

impl DiffAggregate {
    /// Added plus removed lines.
    pub fn total_changes(&self) -> usize {
        self.added + self.removed
    }

    /// Most frequent languages, highest count first, ties by name.
    pub fn top_languages(&self, n: usize) -> Vec<&str> {
        let mut langs: Vec<(&str, usize)> = self
            .languages
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        langs.into_iter().take(n).map(|(name, _)| name).collect()
    }
}

pub fn aggregate(diffs: &[ParsedDiff]) -> DiffAggregate {
    let mut agg = DiffAggregate {
        files_changed: diffs.len(),
        ..Default::default()
    };

    for diff in diffs {
        agg.added += diff.stats.added;
        agg.removed += diff.stats.removed;
        *agg.by_change_type.entry(diff.change_type).or_insert(0) += 1;
        if let Some(lang) = &diff.language {
            *agg.languages.entry(lang.clone()).or_insert(0) += 1;
        }
        agg.total_complexity += diff.complexity;
    }

    agg.total_complexity = round1(agg.total_complexity);
    agg
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn language_multiplier(language: Option<&str>) -> f64 {
    match language {
        Some("assembly") => 3.0,
        Some("cpp") => 2.5,
        Some("rust") => 2.0,
        Some("typescript") | Some("javascript") => 1.5,
        Some("python") => 1.3,
        Some("css") => 0.8,
        Some("markdown") => 0.5,
        Some("json") => 0.3,
        _ => 1.0,
    }
}

pub fn path_multiplier(path: &str) -> f64 {
    let lower = path.to_ascii_lowercase();
    if lower.contains("test") || lower.contains("spec") {
        0.8
    } else if lower.contains("config") || lower.contains("setting") {
        0.6
    } else {
        1.0
    }
}

fn is_test_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.contains("test") || lower.contains("spec")
}

/// Loop, conditional, switch, try/catch, async, await, promise/future,
/// generator and type declaration markers.
fn structural_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"\b(for|while|loop|foreach)\b",
            r"\bif\b",
            r"\b(switch|match)\b",
            r"\b(try|catch|except|rescue)\b",
            r"\basync\b",
            r"\bawait\b",
            r"\b(Promise|Future)\b",
            r"\byield\b|\bfunction\*",
            r"\b(class|interface|struct|trait)\s+\w",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex"))
        .collect()
    })
}

/// 0.5 per structural pattern match over the given lines.
pub fn content_score<'a>(lines: impl IntoIterator<Item = &'a str>) -> f64 {
    let matches: usize = lines
        .into_iter()
        .map(|line| {
            structural_patterns()
                .iter()
                .map(|re| re.find_iter(line).count())
                .sum::<usize>()
        })
        .sum();
    0.5 * matches as f64
}

/// Per-file complexity, rounded to one decimal.
pub fn file_complexity(diff: &ParsedDiff) -> f64 {
    let size = (diff.stats.changed() as f64).sqrt();
    let weighted =
        size * language_multiplier(diff.language.as_deref()) * path_multiplier(diff.path());
    let content = content_score(
        diff.hunks
            .iter()
            .flat_map(|h| h.lines.iter().map(|l| l.text.as_str())),
    );
    round1(weighted + content)
}

/// Markers detected in added lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    TodoComment,
    DebugPrint,
    Credential,
    AsyncCode,
    TypeDeclaration,
    Import,
}

impl Pattern {
    const ALL: [Pattern; 6] = [
        Pattern::TodoComment,
        Pattern::DebugPrint,
        Pattern::Credential,
        Pattern::AsyncCode,
        Pattern::TypeDeclaration,
        Pattern::Import,
    ];

    fn regex(self) -> &'static Regex {
        static REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();
        let regexes = REGEXES.get_or_init(|| {
            [
                r"(?i)\b(todo|fixme)\b",
                concat!(
                    r"(?i)(console\.(log|debug|trace)\s*\(|\bdbg!|\bprintln!|\beprintln!",
                    r"|\bprint\s*\(|\bfmt\.print|system\.out\.print|\bvar_dump\s*\()",
                ),
                r"(?i)(password|secret|api_key)",
                r"(?i)\b(async|await|promise|future)\b",
                r"(?i)\b(class|interface)\s+\w",
                r"(?i)(^\s*(import|use)\s+\S|^\s*from\s+\S+\s+import\b|\brequire\s*\()",
            ]
            .iter()
            .map(|p| Regex::new(p).expect("Invalid regex"))
            .collect()
        });
        &regexes[self as usize]
    }
}

/// Result of pattern and risk detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternReport {
    pub patterns: BTreeSet<Pattern>,
    pub hotspots: Vec<String>,
    pub risks: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn detect_patterns(diffs: &[ParsedDiff]) -> PatternReport {
    let mut report = PatternReport::default();

    for diff in diffs {
        let path = diff.path();

        for line in diff
            .hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.kind == LineKind::Add)
        {
            for pattern in Pattern::ALL {
                if !report.patterns.contains(&pattern) && pattern.regex().is_match(&line.text) {
                    report.patterns.insert(pattern);
                }
            }
        }

        if diff.change_type == ChangeType::Delete && !is_test_path(path) {
            report.risks.push(format!("deletes {}", path));
        }
        if diff.stats.added > HOTSPOT_ADDED_LINES {
            report.hotspots.push(path.to_string());
            report
                .risks
                .push(format!("large addition in {} (+{} lines)", path, diff.stats.added));
        }
        if diff.stats.removed > LARGE_REMOVAL_LINES {
            report
                .risks
                .push(format!("large removal in {} (-{} lines)", path, diff.stats.removed));
        }
    }

    if report.patterns.contains(&Pattern::DebugPrint) {
        report.suggestions.push("remove debug statements".to_string());
    }

    report
}

/// Bucketed composite complexity of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ComplexityLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 10.0 {
            ComplexityLevel::Low
        } else if score < 25.0 {
            ComplexityLevel::Medium
        } else if score < 50.0 {
            ComplexityLevel::High
        } else {
            ComplexityLevel::Critical
        }
    }
}

/// Composite score: file count and size terms plus per-file penalties.
pub fn complexity_score(diffs: &[ParsedDiff]) -> f64 {
    let total_lines: usize = diffs.iter().map(|d| d.stats.changed()).sum();
    let mut score = 2.0 * (diffs.len() as f64).sqrt() + 0.5 * (total_lines as f64).sqrt();

    for diff in diffs {
        score += diff.complexity;
        if diff.change_type == ChangeType::Delete {
            score += 5.0;
        }
        if diff.stats.added > 200 {
            score += 3.0;
        }
        if diff.stats.removed > 100 {
            score += 2.0;
        }
        if matches!(diff.language.as_deref(), Some("cpp" | "rust" | "assembly")) {
            score += 2.0;
        }
    }

    round1(score)
}

pub fn complexity_level(diffs: &[ParsedDiff]) -> ComplexityLevel {
    ComplexityLevel::from_score(complexity_score(diffs))
}

/// Everything the analyzer knows about a batch, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    #[serde(flatten)]
    pub aggregate: DiffAggregate,
    #[serde(flatten)]
    pub report: PatternReport,
    pub complexity_score: f64,
    pub complexity_level: ComplexityLevel,
}

pub fn summarize(diffs: &[ParsedDiff]) -> DiffSummary {
    let complexity_score = complexity_score(diffs);
    DiffSummary {
        aggregate: aggregate(diffs),
        report: detect_patterns(diffs),
        complexity_score,
        complexity_level: ComplexityLevel::from_score(complexity_score),
    }
}

/// Render a short excerpt of one file's change.
///
/// At most `max_lines` changed lines are shown; context lines are omitted.
pub fn snippet(diff: &ParsedDiff, max_lines: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} ({})", diff.path(), diff.change_type);
    if diff.is_binary {
        out.push_str(" [binary]");
        return out;
    }

    let total = diff.stats.changed();
    let mut shown = 0;

    'hunks: for hunk in &diff.hunks {
        if shown >= max_lines {
            break;
        }
        let _ = write!(
            out,
            "\n@@ -{},{} +{},{} @@",
            hunk.old_start, hunk.old_line_count, hunk.new_start, hunk.new_line_count
        );
        if !hunk.header_context.is_empty() {
            let _ = write!(out, " {}", hunk.header_context);
        }

        for line in &hunk.lines {
            let prefix = match line.kind {
                LineKind::Add => '+',
                LineKind::Remove => '-',
                LineKind::Context => continue,
            };
            if shown >= max_lines {
                break 'hunks;
            }
            let _ = write!(out, "\n{}{}", prefix, line.text);
            shown += 1;
        }
    }

    if total > shown {
        let _ = write!(out, "\n… {} more lines", total - shown);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{parse_diffs, DiffHunk, DiffLine, DiffStats};

    fn file(
        path: &str,
        language: Option<&str>,
        change_type: ChangeType,
        added: usize,
        removed: usize,
    ) -> ParsedDiff {
        let mut lines = Vec::new();
        for i in 0..added {
            lines.push(DiffLine {
                kind: LineKind::Add,
                text: format!("value_{} = {}", i, i),
                old_line_no: None,
                new_line_no: Some(i as u32 + 1),
            });
        }
        for i in 0..removed {
            lines.push(DiffLine {
                kind: LineKind::Remove,
                text: format!("old_{}", i),
                old_line_no: Some(i as u32 + 1),
                new_line_no: None,
            });
        }
        let hunks = vec![DiffHunk {
            old_start: 1,
            old_line_count: removed as u32,
            new_start: 1,
            new_line_count: added as u32,
            lines,
            header_context: String::new(),
        }];
        let stats = DiffStats::from_hunks(&hunks);
        let mut diff = ParsedDiff {
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            change_type,
            is_binary: false,
            hunks,
            stats,
            language: language.map(String::from),
            similarity: None,
            old_mode: None,
            new_mode: None,
            complexity: 0.0,
        };
        diff.complexity = file_complexity(&diff);
        diff
    }

    #[test]
    fn test_file_complexity_uses_multipliers() {
        let modify = |path: &str, language: &str, added: usize, removed: usize| {
            file_complexity(&file(path, Some(language), ChangeType::Modify, added, removed))
        };
        // sqrt(16) * 2.0 * 1.0
        assert_eq!(modify("src/lib.rs", "rust", 10, 6), 8.0);
        // sqrt(16) * 1.0 * 0.8
        assert_eq!(modify("tests/it.go", "go", 16, 0), 3.2);
        // sqrt(9) * 0.3 * 0.6
        assert_eq!(modify("config/app.json", "json", 9, 0), 0.5);
    }

    #[test]
    fn test_content_score_counts_structural_matches() {
        let lines = [
            "for item in items {",
            "    if item.ready { await flush(); }",
            "class Parser extends Base {",
        ];
        // for, if, await, class
        assert_eq!(content_score(lines), 2.0);
        assert_eq!(content_score(["let x = 1;"]), 0.0);
    }

    #[test]
    fn test_aggregate() {
        let diffs = vec![
            file("src/a.rs", Some("rust"), ChangeType::Modify, 10, 2),
            file("src/b.rs", Some("rust"), ChangeType::Add, 5, 0),
            file("web/app.ts", Some("typescript"), ChangeType::Delete, 0, 7),
            file("LICENSE", None, ChangeType::Modify, 1, 1),
        ];
        let agg = aggregate(&diffs);
        assert_eq!(agg.files_changed, 4);
        assert_eq!(agg.added, 16);
        assert_eq!(agg.removed, 10);
        assert_eq!(agg.total_changes(), 26);
        assert_eq!(agg.by_change_type[&ChangeType::Modify], 2);
        assert_eq!(agg.by_change_type[&ChangeType::Delete], 1);
        assert_eq!(agg.languages["rust"], 2);
        assert_eq!(agg.top_languages(3), vec!["rust", "typescript"]);
        let expected: f64 = diffs.iter().map(|d| d.complexity).sum();
        assert!((agg.total_complexity - expected).abs() < 0.051);
    }

    #[test]
    fn test_detect_patterns_in_added_lines() {
        let text = "\
diff --git a/src/api.ts b/src/api.ts
--- a/src/api.ts
+++ b/src/api.ts
@@ -1,2 +1,4 @@
 import x from 'x';
-// TODO old note
+import { client } from './client';
+console.log(client);
+const API_KEY = process.env.KEY;
";
        let report = detect_patterns(&parse_diffs(text));
        assert!(report.patterns.contains(&Pattern::Import));
        assert!(report.patterns.contains(&Pattern::DebugPrint));
        assert!(report.patterns.contains(&Pattern::Credential));
        // the TODO was removed, not added
        assert!(!report.patterns.contains(&Pattern::TodoComment));
        assert_eq!(report.suggestions, vec!["remove debug statements".to_string()]);
        assert!(report.risks.is_empty());
    }

    #[test]
    fn test_risks_and_hotspots() {
        let diffs = vec![
            file("src/legacy.rs", Some("rust"), ChangeType::Delete, 0, 3),
            file("tests/old_test.rs", Some("rust"), ChangeType::Delete, 0, 3),
            file("src/generated.rs", Some("rust"), ChangeType::Add, 501, 0),
            file("src/big.rs", Some("rust"), ChangeType::Modify, 0, 201),
        ];
        let report = detect_patterns(&diffs);
        assert_eq!(report.hotspots, vec!["src/generated.rs".to_string()]);
        assert_eq!(report.risks.len(), 3);
        assert!(report.risks[0].contains("src/legacy.rs"));
        assert!(report.risks.iter().all(|r| !r.contains("old_test")));
    }

    #[test]
    fn test_complexity_levels() {
        assert_eq!(ComplexityLevel::from_score(9.9), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::from_score(10.0), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::from_score(25.0), ComplexityLevel::High);
        assert_eq!(ComplexityLevel::from_score(50.0), ComplexityLevel::Critical);
        assert_eq!(complexity_level(&[]), ComplexityLevel::Low);

        // 2*1 + 0.5*1 + 2.0 (complexity) + 2 (rust)
        let small = vec![file("src/a.rs", Some("rust"), ChangeType::Modify, 1, 0)];
        assert_eq!(complexity_score(&small), 6.5);
        assert_eq!(complexity_level(&small), ComplexityLevel::Low);

        let deletion = vec![file("src/legacy.cpp", Some("cpp"), ChangeType::Delete, 0, 250)];
        assert!(complexity_level(&deletion) >= ComplexityLevel::High);
    }

    #[test]
    fn test_snippet_truncates() {
        let diff = file("src/a.py", Some("python"), ChangeType::Modify, 4, 2);
        let text = snippet(&diff, 3);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "src/a.py (modify)");
        assert_eq!(lines[1], "@@ -1,2 +1,4 @@");
        assert_eq!(lines[2], "+value_0 = 0");
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "… 3 more lines");

        let full = snippet(&diff, 10);
        assert!(!full.contains("more lines"));
    }

    #[test]
    fn test_summary_serializes_flat() {
        let diffs = vec![file("src/a.rs", Some("rust"), ChangeType::Modify, 3, 1)];
        let json = serde_json::to_value(summarize(&diffs)).unwrap();
        assert_eq!(json["filesChanged"], 1);
        assert_eq!(json["added"], 3);
        assert_eq!(json["complexityLevel"], "low");
        assert!(json["patterns"].as_array().unwrap().is_empty());
    }
}
