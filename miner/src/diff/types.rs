//! Structured representation of unified diffs.

use serde::{Deserialize, Serialize};

/// How a file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Rename,
    Copy,
    TypeChange,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
            ChangeType::Copy => "copy",
            ChangeType::TypeChange => "type_change",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Add,
    Remove,
    Context,
}

/// One line of a hunk body, without its `+`/`-`/space prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    pub kind: LineKind,
    pub text: String,
    /// Present for Remove and Context lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line_no: Option<u32>,
    /// Present for Add and Context lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line_no: Option<u32>,
}

/// A contiguous region of change opened by an `@@ -o,ol +n,nl @@ ctx` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_line_count: u32,
    pub new_start: u32,
    pub new_line_count: u32,
    pub lines: Vec<DiffLine>,
    /// Trailing text after the closing `@@`, usually a function signature
    pub header_context: String,
}

impl DiffHunk {
    pub fn added(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == LineKind::Add).count()
    }

    pub fn removed(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == LineKind::Remove).count()
    }

    pub fn context(&self) -> usize {
        self.lines.iter().filter(|l| l.kind == LineKind::Context).count()
    }

    /// Whether the body matches the line counts declared in the header.
    pub fn is_consistent(&self) -> bool {
        let old_side = self.removed() + self.context();
        let new_side = self.added() + self.context();
        old_side == self.old_line_count as usize && new_side == self.new_line_count as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub context: usize,
    pub total: usize,
}

impl DiffStats {
    pub fn from_hunks(hunks: &[DiffHunk]) -> Self {
        let (added, removed, context) = hunks.iter().fold((0, 0, 0), |(a, r, c), h| {
            (a + h.added(), r + h.removed(), c + h.context())
        });
        Self {
            added,
            removed,
            context,
            total: added + removed + context,
        }
    }

    /// Added plus removed lines.
    pub fn changed(&self) -> usize {
        self.added + self.removed
    }
}

/// One file's change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDiff {
    /// `None` when the file did not exist before (`/dev/null`)
    pub old_path: Option<String>,
    /// `None` when the file no longer exists
    pub new_path: Option<String>,
    pub change_type: ChangeType,
    pub is_binary: bool,
    pub hunks: Vec<DiffHunk>,
    pub stats: DiffStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Percentage from a `similarity index N%` line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_mode: Option<String>,
    pub complexity: f64,
}

impl ParsedDiff {
    /// The new path if present, else the old one.
    pub fn path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or_default()
    }
}
