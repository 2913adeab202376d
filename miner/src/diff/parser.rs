//! Unified-diff parser.
//!
//! Splits diff text into file sections (`diff --git` boundaries or bare
//! `---`/`+++` patch headers), reads each section's header metadata, then
//! walks its hunks assigning old/new line numbers. A section that cannot be
//! parsed is dropped whole and reported as a [`ParseWarning`].

use super::types::{ChangeType, DiffHunk, DiffLine, DiffStats, LineKind, ParsedDiff};
use crate::{analyzer, language};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const DEV_NULL: &str = "/dev/null";

/// A file section that was skipped because its header could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseWarning {
    /// 1-based line number where the problem was found
    pub line: usize,
    pub message: String,
}

/// Parsed files plus warnings for the sections that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub diffs: Vec<ParsedDiff>,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionForm {
    /// `diff --git a/x b/y` preamble
    Git,
    /// bare `--- x` / `+++ y` pair
    Plain,
}

#[derive(Debug)]
struct Malformed {
    index: usize,
    message: String,
}

impl Malformed {
    fn at(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

/// Header facts collected before the first hunk.
#[derive(Debug, Default)]
struct SectionHeader {
    old_path: Option<String>,
    new_path: Option<String>,
    /// Add/Delete from file-mode lines or a `/dev/null` side
    lifecycle: Option<ChangeType>,
    /// Rename/Copy from explicit `rename`/`copy` lines
    explicit: Option<ChangeType>,
    similarity: Option<u8>,
    old_mode: Option<String>,
    new_mode: Option<String>,
    is_binary: bool,
}

fn git_header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"^diff --git "?a/(.+?)"? "?b/(.+?)"?$"#).expect("Invalid regex")
    })
}

fn hunk_header_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$").expect("Invalid regex")
    })
}

fn similarity_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^similarity index (\d{1,3})%$").expect("Invalid regex"))
}

/// Parse diff text containing any number of file sections.
pub fn parse_diff(text: &str) -> ParseOutcome {
    let lines: Vec<&str> = text.lines().collect();
    let mut outcome = ParseOutcome::default();
    let mut i = 0;

    while i < lines.len() {
        let form = match section_start(&lines, i) {
            Some(form) => form,
            None => {
                i += 1;
                continue;
            }
        };

        match parse_section(&lines, i, form) {
            Ok((diff, next)) => {
                outcome.diffs.push(diff);
                i = next.max(i + 1);
            }
            Err(malformed) => {
                outcome.warnings.push(ParseWarning {
                    line: malformed.index + 1,
                    message: format!("{} (section skipped: {})", malformed.message, lines[i]),
                });
                i = recovery_point(&lines, i + 1, form);
            }
        }
    }

    outcome
}

/// Convenience wrapper that discards warnings.
pub fn parse_diffs(text: &str) -> Vec<ParsedDiff> {
    parse_diff(text).diffs
}

fn section_start(lines: &[&str], i: usize) -> Option<SectionForm> {
    let line = lines[i];
    if line.starts_with("diff --git ") {
        Some(SectionForm::Git)
    } else if line.starts_with("--- ")
        && lines.get(i + 1).is_some_and(|next| next.starts_with("+++ "))
    {
        Some(SectionForm::Plain)
    } else {
        None
    }
}

/// Where to resume scanning after a malformed section.
fn recovery_point(lines: &[&str], from: usize, form: SectionForm) -> usize {
    (from..lines.len())
        .find(|&j| match form {
            SectionForm::Git => lines[j].starts_with("diff --git "),
            SectionForm::Plain => section_start(lines, j).is_some(),
        })
        .unwrap_or(lines.len())
}

fn skip_to_next_section(lines: &[&str], from: usize) -> usize {
    (from..lines.len())
        .find(|&j| section_start(lines, j).is_some())
        .unwrap_or(lines.len())
}

/// Parse one file section starting at `start`; returns the diff and the
/// index of the first line after it.
fn parse_section(
    lines: &[&str],
    start: usize,
    form: SectionForm,
) -> Result<(ParsedDiff, usize), Malformed> {
    let mut header = SectionHeader::default();
    let mut i = start;

    if form == SectionForm::Git {
        let caps = git_header_regex()
            .captures(lines[i])
            .ok_or_else(|| Malformed::at(i, "unrecognized diff --git paths"))?;
        header.old_path = Some(unquote(&caps[1]));
        header.new_path = Some(unquote(&caps[2]));
        i += 1;
    }

    // Header phase
    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("@@") {
            break;
        }
        if form == SectionForm::Git && line.starts_with("diff --git ") {
            return Ok((finish(header, Vec::new()), i));
        }

        if let Some(mode) = line.strip_prefix("new file mode ") {
            header.lifecycle = Some(ChangeType::Add);
            header.new_mode = Some(file_mode(mode, i)?);
        } else if let Some(mode) = line.strip_prefix("deleted file mode ") {
            header.lifecycle = Some(ChangeType::Delete);
            header.old_mode = Some(file_mode(mode, i)?);
        } else if let Some(mode) = line.strip_prefix("old mode ") {
            header.old_mode = Some(file_mode(mode, i)?);
        } else if let Some(mode) = line.strip_prefix("new mode ") {
            header.new_mode = Some(file_mode(mode, i)?);
        } else if line.starts_with("similarity index ") {
            let caps = similarity_regex()
                .captures(line.trim_end())
                .ok_or_else(|| Malformed::at(i, "invalid similarity index"))?;
            let value: u8 = caps[1]
                .parse()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or_else(|| Malformed::at(i, "similarity index out of range"))?;
            header.similarity = Some(value);
        } else if let Some(path) = line.strip_prefix("rename from ") {
            header.explicit = Some(ChangeType::Rename);
            header.old_path = Some(unquote(path));
        } else if let Some(path) = line.strip_prefix("rename to ") {
            header.explicit = Some(ChangeType::Rename);
            header.new_path = Some(unquote(path));
        } else if let Some(path) = line.strip_prefix("copy from ") {
            header.explicit = Some(ChangeType::Copy);
            header.old_path = Some(unquote(path));
        } else if let Some(path) = line.strip_prefix("copy to ") {
            header.explicit = Some(ChangeType::Copy);
            header.new_path = Some(unquote(path));
        } else if line.starts_with("index ") || line.starts_with("dissimilarity index ") {
            // object ids and dissimilarity carry nothing we keep
        } else if (line.starts_with("Binary files ") && line.ends_with(" differ"))
            || line == "GIT binary patch"
        {
            header.is_binary = true;
            let next = skip_to_next_section(lines, i + 1);
            return Ok((finish(header, Vec::new()), next));
        } else if let Some(rest) = line.strip_prefix("--- ") {
            match patch_path(rest) {
                None => {
                    header.old_path = None;
                    header.lifecycle.get_or_insert(ChangeType::Add);
                }
                Some(path) if form == SectionForm::Plain => header.old_path = Some(path),
                Some(_) => {}
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            match patch_path(rest) {
                None => {
                    header.new_path = None;
                    header.lifecycle.get_or_insert(ChangeType::Delete);
                }
                Some(path) if form == SectionForm::Plain => header.new_path = Some(path),
                Some(_) => {}
            }
        } else if form == SectionForm::Git {
            // Foreign text ends a hunk-less section (pure rename, mode change)
            return Ok((finish(header, Vec::new()), i));
        } else {
            return Err(Malformed::at(i, "expected hunk marker after patch header"));
        }

        i += 1;
    }

    if form == SectionForm::Plain && header.old_path.is_none() && header.new_path.is_none() {
        return Err(Malformed::at(start, "patch header names no file"));
    }

    // Hunk phase
    let mut hunks = Vec::new();
    while i < lines.len() && lines[i].starts_with("@@") {
        let (hunk, next) = parse_hunk(lines, i)?;
        hunks.push(hunk);
        i = next;
        while i < lines.len() && lines[i].starts_with('\\') {
            i += 1;
        }
    }

    if form == SectionForm::Plain && hunks.is_empty() {
        return Err(Malformed::at(start, "patch header without hunks"));
    }

    Ok((finish(header, hunks), i))
}

/// Parse the hunk whose marker is at `start`. Body lines are consumed until
/// both declared counts are exhausted or a line that cannot belong to the
/// hunk is reached.
fn parse_hunk(lines: &[&str], start: usize) -> Result<(DiffHunk, usize), Malformed> {
    let caps = hunk_header_regex()
        .captures(lines[start])
        .ok_or_else(|| Malformed::at(start, "invalid hunk marker"))?;

    let number = |idx: usize| -> Result<Option<u32>, Malformed> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<u32>())
            .transpose()
            .map_err(|_| Malformed::at(start, "hunk range out of bounds"))
    };

    let old_start = number(1)?.unwrap_or(0);
    let old_line_count = number(2)?.unwrap_or(1);
    let new_start = number(3)?.unwrap_or(0);
    let new_line_count = number(4)?.unwrap_or(1);
    // line cursors never pass start + count
    if old_start.checked_add(old_line_count).is_none()
        || new_start.checked_add(new_line_count).is_none()
    {
        return Err(Malformed::at(start, "hunk range out of bounds"));
    }
    let header_context = caps
        .get(5)
        .map(|m| m.as_str().trim())
        .unwrap_or_default()
        .to_string();

    let mut old_remaining = old_line_count;
    let mut new_remaining = new_line_count;
    let mut old_no = old_start;
    let mut new_no = new_start;
    let mut body = Vec::new();
    let mut i = start + 1;

    while i < lines.len() && (old_remaining > 0 || new_remaining > 0) {
        let line = lines[i];
        if line.starts_with("@@") || line.starts_with("diff --git ") {
            break;
        }

        let (kind, text) = match line.as_bytes().first() {
            Some(b'+') => (LineKind::Add, &line[1..]),
            Some(b'-') => (LineKind::Remove, &line[1..]),
            Some(b' ') => (LineKind::Context, &line[1..]),
            Some(b'\\') => {
                i += 1;
                continue;
            }
            // some tools strip the space from blank context lines
            None => (LineKind::Context, ""),
            Some(_) => break,
        };

        let diff_line = match kind {
            LineKind::Add if new_remaining > 0 => {
                let l = DiffLine {
                    kind,
                    text: text.to_string(),
                    old_line_no: None,
                    new_line_no: Some(new_no),
                };
                new_no += 1;
                new_remaining -= 1;
                l
            }
            LineKind::Remove if old_remaining > 0 => {
                let l = DiffLine {
                    kind,
                    text: text.to_string(),
                    old_line_no: Some(old_no),
                    new_line_no: None,
                };
                old_no += 1;
                old_remaining -= 1;
                l
            }
            LineKind::Context if old_remaining > 0 && new_remaining > 0 => {
                let l = DiffLine {
                    kind,
                    text: text.to_string(),
                    old_line_no: Some(old_no),
                    new_line_no: Some(new_no),
                };
                old_no += 1;
                new_no += 1;
                old_remaining -= 1;
                new_remaining -= 1;
                l
            }
            // line overruns the declared range
            _ => break,
        };

        body.push(diff_line);
        i += 1;
    }

    Ok((
        DiffHunk {
            old_start,
            old_line_count,
            new_start,
            new_line_count,
            lines: body,
            header_context,
        },
        i,
    ))
}

/// Decide the change type. File-mode lifecycle (add/delete) wins, then
/// explicit rename/copy markers, then the similarity heuristic, then a
/// file-type change in the mode bits.
pub fn resolve_change_type(
    lifecycle: Option<ChangeType>,
    explicit: Option<ChangeType>,
    similarity: Option<u8>,
    old_mode: Option<&str>,
    new_mode: Option<&str>,
) -> ChangeType {
    if let Some(kind) = lifecycle {
        return kind;
    }
    if let Some(kind) = explicit {
        return kind;
    }
    match similarity {
        Some(100) => return ChangeType::Rename,
        Some(n) if n > 50 => return ChangeType::Copy,
        _ => {}
    }
    match (old_mode, new_mode) {
        (Some(old), Some(new)) if file_type_bits(old) != file_type_bits(new) => {
            ChangeType::TypeChange
        }
        _ => ChangeType::Modify,
    }
}

/// Octal mode from an `old mode`/`new mode`/file mode line.
fn file_mode(raw: &str, index: usize) -> Result<String, Malformed> {
    let mode = raw.trim();
    if mode.is_empty() || !mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(Malformed::at(index, "invalid file mode"));
    }
    Ok(mode.to_string())
}

/// `100644` -> `100`, `120000` -> `120`; permission bits are ignored.
fn file_type_bits(mode: &str) -> &str {
    let end = mode.len().saturating_sub(3);
    mode.get(..end).unwrap_or(mode)
}

fn finish(header: SectionHeader, hunks: Vec<DiffHunk>) -> ParsedDiff {
    let change_type = resolve_change_type(
        header.lifecycle,
        header.explicit,
        header.similarity,
        header.old_mode.as_deref(),
        header.new_mode.as_deref(),
    );

    let (old_path, new_path) = match change_type {
        ChangeType::Add => (None, header.new_path.or(header.old_path)),
        ChangeType::Delete => (header.old_path.or(header.new_path), None),
        _ => (header.old_path, header.new_path),
    };

    let hunks = if header.is_binary { Vec::new() } else { hunks };
    let stats = DiffStats::from_hunks(&hunks);

    let mut diff = ParsedDiff {
        old_path,
        new_path,
        change_type,
        is_binary: header.is_binary,
        hunks,
        stats,
        language: None,
        similarity: header.similarity,
        old_mode: header.old_mode,
        new_mode: header.new_mode,
        complexity: 0.0,
    };
    diff.language = language::detect_language(diff.path()).map(String::from);
    diff.complexity = analyzer::file_complexity(&diff);
    diff
}

/// Path from a `---`/`+++` line; `None` for `/dev/null`.
fn patch_path(rest: &str) -> Option<String> {
    // drop a trailing tab-separated timestamp
    let raw = rest.split('\t').next().unwrap_or(rest).trim_end();
    if raw == DEV_NULL {
        return None;
    }
    let path = unquote(raw);
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .map(String::from)
        .unwrap_or(path);
    Some(path)
}

/// Undo git's C-style quoting of unusual paths.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let inner = match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(inner) => inner,
        None if !raw.contains('\\') => return raw.to_string(),
        None => raw,
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
