use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Added => "A",
            FileStatus::Modified => "M",
            FileStatus::Deleted => "D",
            FileStatus::Renamed => "R",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Add,
    Delete,
    Context,
}

impl LineType {
    /// Single-character classification tag, as printed in a unified diff gutter.
    pub fn tag(&self) -> char {
        match self {
            LineType::Add => '+',
            LineType::Delete => '-',
            LineType::Context => ' ',
        }
    }

    /// Map a libgit2 line origin to a line type. Anything that is not an
    /// addition or deletion inside a hunk is treated as context.
    pub fn from_origin(origin: char) -> Self {
        match origin {
            '+' => LineType::Add,
            '-' => LineType::Delete,
            _ => LineType::Context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
    pub old_num: Option<u32>,
    pub new_num: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFile {
    pub path: String,
    pub status: FileStatus,
    pub old_path: Option<String>,
    pub hunks: Vec<DiffHunk>,
}

impl DiffFile {
    /// Count of added and deleted lines across all hunks.
    pub fn line_stats(&self) -> (usize, usize) {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .fold((0, 0), |(add, del), line| match line.line_type {
                LineType::Add => (add + 1, del),
                LineType::Delete => (add, del + 1),
                LineType::Context => (add, del),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub base_ref: String,
    pub compare_ref: String,
    pub files: Vec<DiffFile>,
}

/// Label used as `compare_ref` when diffing against the working tree.
pub const WORKING_TREE: &str = "working tree";

/// What to diff: a base revspec against another revspec, or against the
/// working tree when `compare` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTarget {
    pub base: String,
    pub compare: Option<String>,
    pub context_lines: u32,
}

impl ComparisonTarget {
    pub fn new(base: &str, compare: Option<String>) -> Self {
        Self {
            base: base.to_string(),
            compare,
            context_lines: 3,
        }
    }

    pub fn compare_label(&self) -> &str {
        self.compare.as_deref().unwrap_or(WORKING_TREE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Branch,
    Tag,
    Worktree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefInfo {
    pub name: String,
    pub ref_type: RefType,
}
