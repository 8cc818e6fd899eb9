use std::collections::HashMap;

use tracing::debug;

use crate::git::types::DiffFile;

const FINGERPRINT_SEED: i32 = 5381;

/// Viewed/total pair for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewedProgress {
    pub viewed: usize,
    pub total: usize,
}

/// Tracks which files the reviewer has marked as viewed. In-memory only
/// (resets on quit).
///
/// Each entry stores the fingerprint of the file's diff at the moment it was
/// marked. A file counts as viewed only while that fingerprint still matches
/// its current content, so any change to the diff un-marks it.
#[derive(Debug, Default)]
pub struct ViewedFiles {
    marks: HashMap<String, String>,
}

impl ViewedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmark the file if it is marked with its current fingerprint,
    /// otherwise mark it. A file whose content changed since it was marked
    /// gets re-marked, not cleared. Returns the new viewed state.
    pub fn toggle(&mut self, file: &DiffFile) -> bool {
        let print = fingerprint(file);
        if self.marks.get(&file.path) == Some(&print) {
            self.marks.remove(&file.path);
            debug!(path = %file.path, "unmarked viewed");
            false
        } else {
            debug!(path = %file.path, fingerprint = %print, "marked viewed");
            self.marks.insert(file.path.clone(), print);
            true
        }
    }

    pub fn is_viewed(&self, file: &DiffFile) -> bool {
        self.marks
            .get(&file.path)
            .is_some_and(|stored| *stored == fingerprint(file))
    }

    /// Drop marks for paths missing from `files` and marks whose fingerprint
    /// no longer matches. Returns how many marks were dropped.
    pub fn reconcile(&mut self, files: &[DiffFile]) -> usize {
        let current: HashMap<&str, &DiffFile> =
            files.iter().map(|f| (f.path.as_str(), f)).collect();

        let before = self.marks.len();
        self.marks.retain(|path, stored| {
            current
                .get(path.as_str())
                .is_some_and(|file| *stored == fingerprint(file))
        });
        let dropped = before - self.marks.len();
        if dropped > 0 {
            debug!(dropped, remaining = self.marks.len(), "reconciled viewed marks");
        }
        dropped
    }

    pub fn viewed_count(&self, files: &[DiffFile]) -> ViewedProgress {
        ViewedProgress {
            viewed: files.iter().filter(|f| self.is_viewed(f)).count(),
            total: files.len(),
        }
    }

    /// Number of stored marks, stale or not.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Reset all marks.
    pub fn clear(&mut self) {
        self.marks.clear();
    }
}

/// Short digest of a file's diff content.
///
/// Folds `tag + content` of every line, in hunk order, through a 32-bit
/// `hash * 33 + unit` rolling hash over UTF-16 code units, seeded with 5381
/// and wrapping as a signed integer. The result is printed in base 36.
/// This detects changes; it is not collision resistant.
pub fn fingerprint(file: &DiffFile) -> String {
    let mut hash = FINGERPRINT_SEED;
    let mut tag_buf = [0u16; 2];
    for line in file.hunks.iter().flat_map(|h| &h.lines) {
        let tag = line.line_type.tag().encode_utf16(&mut tag_buf);
        for &unit in tag.iter() {
            hash = fold(hash, unit);
        }
        for unit in line.content.encode_utf16() {
            hash = fold(hash, unit);
        }
    }
    to_base36(hash)
}

fn fold(hash: i32, unit: u16) -> i32 {
    hash.wrapping_mul(33).wrapping_add(i32::from(unit))
}

fn to_base36(value: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = i64::from(value).unsigned_abs();
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::{DiffHunk, DiffLine, FileStatus, LineType};

    fn line(line_type: LineType, content: &str) -> DiffLine {
        DiffLine {
            line_type,
            content: content.to_string(),
            old_num: None,
            new_num: Some(1),
        }
    }

    fn file(path: &str, lines: Vec<DiffLine>) -> DiffFile {
        DiffFile {
            path: path.to_string(),
            status: FileStatus::Modified,
            old_path: None,
            hunks: vec![DiffHunk {
                old_start: 1,
                old_lines: 1,
                new_start: 1,
                new_lines: 1,
                lines,
            }],
        }
    }

    #[test]
    fn test_fingerprint_of_empty_file_is_seed() {
        let empty = DiffFile {
            path: "empty".into(),
            status: FileStatus::Added,
            old_path: None,
            hunks: Vec::new(),
        };
        assert_eq!(fingerprint(&empty), "45h");
    }

    #[test]
    fn test_fingerprint_known_value() {
        // 5381 -> *33 + '+' -> *33 + 'a' = 5861425
        let f = file("a.rs", vec![line(LineType::Add, "a")]);
        assert_eq!(fingerprint(&f), "3hmpd");
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = file("a.rs", vec![line(LineType::Context, "x"), line(LineType::Add, "y")]);
        let b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_ignores_path_and_line_numbers() {
        let a = file("a.rs", vec![line(LineType::Add, "same")]);
        let mut b = file("b.rs", vec![line(LineType::Add, "same")]);
        b.hunks[0].lines[0].new_num = Some(40);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_spans_hunks_in_order() {
        let mut split = file("a.rs", vec![line(LineType::Add, "one")]);
        split.hunks.push(DiffHunk {
            old_start: 10,
            old_lines: 0,
            new_start: 10,
            new_lines: 1,
            lines: vec![line(LineType::Add, "two")],
        });
        let joined = file(
            "a.rs",
            vec![line(LineType::Add, "one"), line(LineType::Add, "two")],
        );
        assert_eq!(fingerprint(&split), fingerprint(&joined));
    }

    #[test]
    fn test_fingerprint_counts_utf16_units() {
        // U+1F600 is a surrogate pair in UTF-16.
        let f = file("emoji", vec![line(LineType::Context, "\u{1F600}")]);
        let mut hash = FINGERPRINT_SEED;
        for unit in [u16::from(b' '), 0xD83D, 0xDE00] {
            hash = fold(hash, unit);
        }
        assert_eq!(fingerprint(&f), to_base36(hash));
    }

    #[test]
    fn test_base36_negative_and_extremes() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(-1), "-1");
        assert_eq!(to_base36(i32::MIN), "-zik0zk");
    }

    #[test]
    fn test_fold_wraps_to_signed_32_bit() {
        assert_eq!(fold(i32::MAX, 0), i32::MAX.wrapping_mul(33));
        assert!(fold(100_000_000, 0) < 0);
    }

    #[test]
    fn test_toggle_is_involution_on_unchanged_content() {
        let mut viewed = ViewedFiles::new();
        let f = file("a.rs", vec![line(LineType::Add, "a")]);
        assert!(!viewed.is_viewed(&f));

        assert!(viewed.toggle(&f));
        assert!(viewed.is_viewed(&f));

        assert!(!viewed.toggle(&f));
        assert!(!viewed.is_viewed(&f));
        assert!(viewed.is_empty());
    }

    #[test]
    fn test_content_change_unmarks() {
        let mut viewed = ViewedFiles::new();
        let before = file("a.rs", vec![line(LineType::Add, "a")]);
        viewed.toggle(&before);
        assert!(viewed.is_viewed(&before));

        let after = file("a.rs", vec![line(LineType::Add, "b")]);
        assert!(!viewed.is_viewed(&after));
    }

    #[test]
    fn test_line_type_change_unmarks() {
        let mut viewed = ViewedFiles::new();
        let before = file("a.rs", vec![line(LineType::Add, "a")]);
        viewed.toggle(&before);

        let after = file("a.rs", vec![line(LineType::Delete, "a")]);
        assert!(!viewed.is_viewed(&after));
    }

    #[test]
    fn test_toggle_on_changed_file_marks_it() {
        let mut viewed = ViewedFiles::new();
        let before = file("a.rs", vec![line(LineType::Add, "a")]);
        viewed.toggle(&before);

        let after = file("a.rs", vec![line(LineType::Add, "b")]);
        assert!(viewed.toggle(&after));
        assert!(viewed.is_viewed(&after));
        assert!(!viewed.is_viewed(&before));
    }

    #[test]
    fn test_reconcile_drops_absent_paths() {
        let mut viewed = ViewedFiles::new();
        let a = file("a.rs", vec![line(LineType::Add, "a")]);
        let b = file("b.rs", vec![line(LineType::Add, "b")]);
        viewed.toggle(&a);
        viewed.toggle(&b);

        let dropped = viewed.reconcile(std::slice::from_ref(&a));
        assert_eq!(dropped, 1);
        assert_eq!(viewed.len(), 1);
        assert!(viewed.is_viewed(&a));
    }

    #[test]
    fn test_reconcile_drops_stale_fingerprints() {
        let mut viewed = ViewedFiles::new();
        let a = file("a.rs", vec![line(LineType::Add, "a")]);
        let b = file("b.rs", vec![line(LineType::Add, "b")]);
        viewed.toggle(&a);
        viewed.toggle(&b);

        let b_changed = file("b.rs", vec![line(LineType::Add, "b2")]);
        let current = vec![a.clone(), b_changed.clone()];
        assert_eq!(viewed.reconcile(&current), 1);

        assert!(viewed.is_viewed(&a));
        assert!(!viewed.is_viewed(&b_changed));
        assert_eq!(viewed.len(), 1);

        // Map and is_viewed agree for every remaining file.
        let progress = viewed.viewed_count(&current);
        assert_eq!(progress.viewed, viewed.len());
    }

    #[test]
    fn test_reconcile_keeps_unchanged_marks() {
        let mut viewed = ViewedFiles::new();
        let a = file("a.rs", vec![line(LineType::Add, "a")]);
        viewed.toggle(&a);
        assert_eq!(viewed.reconcile(&[a.clone()]), 0);
        assert!(viewed.is_viewed(&a));
    }

    #[test]
    fn test_reconcile_with_empty_list_clears() {
        let mut viewed = ViewedFiles::new();
        viewed.toggle(&file("a.rs", vec![line(LineType::Add, "a")]));
        viewed.reconcile(&[]);
        assert!(viewed.is_empty());
    }

    #[test]
    fn test_viewed_count() {
        let mut viewed = ViewedFiles::new();
        let f1 = file("f1.rs", vec![line(LineType::Add, "one")]);
        let f2 = file("f2.rs", vec![line(LineType::Add, "two")]);
        viewed.toggle(&f1);

        assert_eq!(
            viewed.viewed_count(&[f1, f2]),
            ViewedProgress {
                viewed: 1,
                total: 2
            }
        );
    }

    #[test]
    fn test_viewed_count_empty() {
        let viewed = ViewedFiles::new();
        assert_eq!(viewed.viewed_count(&[]), ViewedProgress::default());
    }

    #[test]
    fn test_clear() {
        let mut viewed = ViewedFiles::new();
        let a = file("a.rs", vec![line(LineType::Add, "a")]);
        viewed.toggle(&a);
        viewed.clear();
        assert!(!viewed.is_viewed(&a));
    }
}
