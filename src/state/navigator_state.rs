use crate::git::types::{DiffFile, FileStatus};

use super::input_buffer::{Edit, InputBuffer};

#[derive(Debug)]
pub struct NavigatorEntry {
    pub display: String,
    pub path: String,
    pub file_index: usize,
}

#[derive(Debug, Default)]
pub struct NavigatorState {
    pub selected: usize,
    pub entries: Vec<NavigatorEntry>,
    pub filtered_indices: Vec<usize>,
    pub search_active: bool,
    pub search_query: InputBuffer,
    /// Selection before the filter opened, restored on cancel.
    pre_search_selected: Option<usize>,
}

impl NavigatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_files(&mut self, files: &[DiffFile]) {
        let previous = self.selected_file_index().map(|i| self.entries[i].path.clone());

        self.entries = files
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let (adds, dels) = f.line_stats();
                let name = match (&f.status, &f.old_path) {
                    (FileStatus::Renamed, Some(old)) => format!("{old} \u{2192} {}", f.path),
                    _ => f.path.clone(),
                };
                NavigatorEntry {
                    display: format!("{name} [{}] +{adds} -{dels}", f.status.label()),
                    path: f.path.clone(),
                    file_index: i,
                }
            })
            .collect();

        self.refilter();

        if let Some(path) = previous {
            if let Some(pos) = self
                .filtered_indices
                .iter()
                .position(|&i| self.entries[i].path == path)
            {
                self.selected = pos;
            }
        }
    }

    pub fn refilter(&mut self) {
        let query = self.search_query.text().to_lowercase();
        self.filtered_indices = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| query.is_empty() || fuzzy_match(&e.path.to_lowercase(), &query))
            .map(|(i, _)| i)
            .collect();

        self.selected = self
            .selected
            .min(self.filtered_indices.len().saturating_sub(1));
    }

    pub fn visible_entries(&self) -> Vec<(usize, &NavigatorEntry)> {
        self.filtered_indices
            .iter()
            .map(|&i| (i, &self.entries[i]))
            .collect()
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if !self.filtered_indices.is_empty() {
            self.selected = (self.selected + 1).min(self.filtered_indices.len() - 1);
        }
    }

    pub fn select_top(&mut self) {
        self.selected = 0;
    }

    pub fn select_bottom(&mut self) {
        self.selected = self.filtered_indices.len().saturating_sub(1);
    }

    /// Move the selection to the entry for `file_index` if it is visible.
    pub fn select_file(&mut self, file_index: usize) -> bool {
        match self
            .filtered_indices
            .iter()
            .position(|&i| self.entries[i].file_index == file_index)
        {
            Some(pos) => {
                self.selected = pos;
                true
            }
            None => false,
        }
    }

    fn selected_file_index(&self) -> Option<usize> {
        self.filtered_indices.get(self.selected).copied()
    }

    /// Index into the diff's file list for the selected entry.
    pub fn selected_diff_index(&self) -> Option<usize> {
        self.selected_file_index()
            .and_then(|i| self.entries.get(i))
            .map(|e| e.file_index)
    }

    pub fn start_search(&mut self) {
        self.pre_search_selected = Some(self.selected);
        self.search_active = true;
        self.search_query.clear();
    }

    /// Enter: keep the entry selected in the filtered list, then show all
    /// entries again.
    pub fn confirm_search(&mut self) {
        let target = self.selected_diff_index();
        self.search_active = false;
        self.search_query.clear();
        self.refilter();
        if let Some(file_index) = target {
            self.select_file(file_index);
        }
        self.pre_search_selected = None;
    }

    /// Esc: restore the selection from before the filter opened.
    pub fn cancel_search(&mut self) {
        let restore = self.pre_search_selected.take();
        self.search_active = false;
        self.search_query.clear();
        self.refilter();
        if let Some(prev) = restore {
            self.selected = prev.min(self.filtered_indices.len().saturating_sub(1));
        }
    }

    pub fn edit_search(&mut self, edit: Edit) {
        self.search_query.apply(edit);
        self.selected = 0;
        self.refilter();
    }
}

/// All characters of `pattern` must appear in `text` in order.
fn fuzzy_match(text: &str, pattern: &str) -> bool {
    let mut text_iter = text.chars();
    pattern
        .chars()
        .all(|pc| text_iter.by_ref().any(|tc| tc == pc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::types::{DiffHunk, DiffLine, LineType};

    fn file(path: &str) -> DiffFile {
        DiffFile {
            path: path.to_string(),
            status: FileStatus::Modified,
            old_path: None,
            hunks: vec![DiffHunk {
                old_start: 1,
                old_lines: 1,
                new_start: 1,
                new_lines: 1,
                lines: vec![DiffLine {
                    line_type: LineType::Add,
                    content: "x".into(),
                    old_num: None,
                    new_num: Some(1),
                }],
            }],
        }
    }

    fn navigator(paths: &[&str]) -> NavigatorState {
        let mut nav = NavigatorState::new();
        let files: Vec<_> = paths.iter().map(|p| file(p)).collect();
        nav.update_from_files(&files);
        nav
    }

    fn type_query(nav: &mut NavigatorState, query: &str) {
        query.chars().for_each(|c| nav.edit_search(Edit::Insert(c)));
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("src/app.rs", "sapp"));
        assert!(fuzzy_match("src/app.rs", ""));
        assert!(!fuzzy_match("src/app.rs", "zz"));
        assert!(!fuzzy_match("ab", "ba"));
    }

    #[test]
    fn test_display_includes_status_and_stats() {
        let nav = navigator(&["src/main.rs"]);
        assert_eq!(nav.entries[0].display, "src/main.rs [M] +1 -0");
    }

    #[test]
    fn test_renamed_display_shows_old_path() {
        let mut renamed = file("new.rs");
        renamed.status = FileStatus::Renamed;
        renamed.old_path = Some("old.rs".into());
        let mut nav = NavigatorState::new();
        nav.update_from_files(&[renamed]);
        assert!(nav.entries[0].display.starts_with("old.rs \u{2192} new.rs [R]"));
    }

    #[test]
    fn test_filter_and_confirm_keeps_selection() {
        let mut nav = navigator(&["a.rs", "lib/b.rs", "c.rs"]);
        nav.start_search();
        type_query(&mut nav, "lib");
        assert_eq!(nav.visible_entries().len(), 1);
        assert_eq!(nav.selected_diff_index(), Some(1));

        nav.confirm_search();
        assert!(!nav.search_active);
        assert_eq!(nav.visible_entries().len(), 3);
        assert_eq!(nav.selected_diff_index(), Some(1));
    }

    #[test]
    fn test_cancel_search_restores_selection() {
        let mut nav = navigator(&["a.rs", "b.rs", "c.rs"]);
        nav.select_bottom();
        nav.start_search();
        type_query(&mut nav, "a");
        nav.cancel_search();
        assert_eq!(nav.selected, 2);
    }

    #[test]
    fn test_selection_clamped_on_shrink() {
        let mut nav = navigator(&["a.rs", "b.rs", "c.rs"]);
        nav.select_bottom();
        nav.update_from_files(&[file("a.rs")]);
        assert_eq!(nav.selected, 0);
    }

    #[test]
    fn test_update_keeps_selected_path() {
        let mut nav = navigator(&["a.rs", "b.rs", "c.rs"]);
        nav.select_down();
        nav.update_from_files(&[file("b.rs"), file("c.rs")]);
        assert_eq!(nav.selected_diff_index(), Some(0));
        assert_eq!(nav.entries[0].path, "b.rs");
    }

    #[test]
    fn test_select_file_hidden_by_filter() {
        let mut nav = navigator(&["a.rs", "b.rs"]);
        nav.start_search();
        type_query(&mut nav, "a");
        assert!(!nav.select_file(1));
        assert!(nav.select_file(0));
    }
}
