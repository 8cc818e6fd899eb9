use crate::git::types::{DiffFile, DiffHunk, DiffLine, DiffResult};

/// One rendered row of the unified view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRow<'a> {
    HunkHeader(&'a DiffHunk),
    Line(&'a DiffLine),
}

/// Flatten a file into display rows: each hunk's header followed by its lines.
pub fn display_rows(file: &DiffFile) -> Vec<DiffRow<'_>> {
    file.hunks
        .iter()
        .flat_map(|hunk| {
            std::iter::once(DiffRow::HunkHeader(hunk)).chain(hunk.lines.iter().map(DiffRow::Line))
        })
        .collect()
}

pub struct DiffState {
    pub result: Option<DiffResult>,
    pub selected_file: Option<usize>,
    /// Row offset from the top of the diff viewport.
    pub scroll_offset: usize,
    pub cursor_row: usize,
    /// Row where a line-range selection started; the cursor is the other end.
    pub selection_anchor: Option<usize>,
    pub viewport_height: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    pub fn new() -> Self {
        Self {
            result: None,
            selected_file: None,
            scroll_offset: 0,
            cursor_row: 0,
            selection_anchor: None,
            viewport_height: 20,
            loading: false,
            error: None,
        }
    }

    pub fn files(&self) -> &[DiffFile] {
        self.result.as_ref().map_or(&[], |r| r.files.as_slice())
    }

    pub fn selected(&self) -> Option<&DiffFile> {
        self.selected_file.and_then(|i| self.files().get(i))
    }

    pub fn row_count(&self) -> usize {
        self.selected()
            .map(|f| f.hunks.iter().map(|h| h.lines.len() + 1).sum())
            .unwrap_or(0)
    }

    /// Start a range selection at the cursor, or drop the current one.
    pub fn toggle_selection(&mut self) {
        self.selection_anchor = match self.selection_anchor {
            Some(_) => None,
            None => Some(self.cursor_row),
        };
    }

    /// Inclusive row span covered by the selection, or just the cursor row.
    pub fn selected_rows(&self) -> (usize, usize) {
        match self.selection_anchor {
            Some(anchor) => (anchor.min(self.cursor_row), anchor.max(self.cursor_row)),
            None => (self.cursor_row, self.cursor_row),
        }
    }

    /// Diff lines inside [`selected_rows`](Self::selected_rows). Hunk headers
    /// are skipped.
    pub fn selected_lines(&self) -> Vec<&DiffLine> {
        let Some(file) = self.selected() else {
            return Vec::new();
        };
        let (start, end) = self.selected_rows();
        display_rows(file)
            .into_iter()
            .skip(start)
            .take(end + 1 - start)
            .filter_map(|row| match row {
                DiffRow::Line(line) => Some(line),
                DiffRow::HunkHeader(_) => None,
            })
            .collect()
    }

    /// Install a new result, keeping the selection on the same path when it
    /// still exists.
    pub fn apply_result(&mut self, result: DiffResult) {
        let previous = self.selected().map(|f| f.path.clone());
        self.result = Some(result);
        self.error = None;

        let files = self.files();
        let kept = previous
            .as_ref()
            .and_then(|path| files.iter().position(|f| &f.path == path));
        let selected = kept.or(if files.is_empty() { None } else { Some(0) });

        if kept.is_none() {
            self.cursor_row = 0;
            self.scroll_offset = 0;
            self.selection_anchor = None;
        }
        self.selected_file = selected;
        self.clamp_cursor();
    }

    pub fn select(&mut self, index: usize) {
        if self.selected_file != Some(index) {
            self.selected_file = Some(index);
            self.cursor_row = 0;
            self.scroll_offset = 0;
            self.selection_anchor = None;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let max = self.row_count().saturating_sub(1);
        self.cursor_row = self.cursor_row.saturating_add_signed(delta).min(max);
        self.follow_cursor();
    }

    pub fn cursor_to_top(&mut self) {
        self.cursor_row = 0;
        self.scroll_offset = 0;
    }

    pub fn cursor_to_bottom(&mut self) {
        self.cursor_row = self.row_count().saturating_sub(1);
        self.follow_cursor();
    }

    fn clamp_cursor(&mut self) {
        let max = self.row_count().saturating_sub(1);
        self.cursor_row = self.cursor_row.min(max);
        self.selection_anchor = self.selection_anchor.map(|a| a.min(max));
        self.follow_cursor();
    }

    /// Scroll just enough to keep the cursor inside the viewport.
    fn follow_cursor(&mut self) {
        let vh = self.viewport_height.max(1);
        if self.cursor_row < self.scroll_offset {
            self.scroll_offset = self.cursor_row;
        } else if self.cursor_row >= self.scroll_offset + vh {
            self.scroll_offset = self.cursor_row + 1 - vh;
        }
    }
}
