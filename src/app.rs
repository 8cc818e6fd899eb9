use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use std::cell::Cell;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::action::Action;
use crate::async_diff::{DiffOutcome, DiffRequest, DiffWorker};
use crate::comments;
use crate::components::action_hud::{hud_height, ActionHud};
use crate::components::comment_editor::render_comment_editor;
use crate::components::context_bar::ContextBar;
use crate::components::diff_view::DiffView;
use crate::components::navigator::{scroll_offset, Navigator};
use crate::components::Component;
use crate::event::{map_key_to_action, Event, EventReader, KeyContext};
use crate::git::types::ComparisonTarget;
use crate::state::app_state::{CommentDraft, FocusPanel};
use crate::state::comment_queue::CommentAnchor;
use crate::state::diff_state::DiffState;
use crate::state::input_buffer::InputBuffer;
use crate::state::AppState;
use crate::theme::{PaletteSurface, SystemSchemeSource, ThemeStore};
use crate::tui::Tui;

/// Ticks a status message stays visible (~3 seconds at 50ms).
const STATUS_TICKS: u32 = 60;

pub struct App {
    state: AppState,
    worker: DiffWorker,
    target: ComparisonTarget,
    generation: u64,
    status_clear_countdown: u32,
    repo_path: PathBuf,
    nav_area: Cell<Rect>,
    scheme_poll: Duration,
}

impl App {
    pub fn new(
        target: ComparisonTarget,
        repo_path: PathBuf,
        theme: ThemeStore<PaletteSurface>,
        scheme_poll: Duration,
    ) -> Self {
        let worker = DiffWorker::new(repo_path.clone());
        Self {
            state: AppState::new(theme),
            worker,
            target,
            generation: 0,
            status_clear_countdown: 0,
            repo_path,
            nav_area: Cell::new(Rect::default()),
            scheme_poll,
        }
    }

    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut events = EventReader::new(Duration::from_millis(50));

        let scheme_tx = events.sender();
        let source = SystemSchemeSource::new(self.scheme_poll);
        self.state.theme.initialize(
            &source,
            Box::new(move |scheme| {
                let _ = scheme_tx.send(Event::SchemeChanged(scheme));
            }),
        );

        self.request_diff();

        let context_bar = ContextBar;
        let navigator = Navigator;
        let diff_view = DiffView;
        let action_hud = ActionHud;

        loop {
            self.poll_diff_results();

            let term_size = terminal.size()?;
            let hud_h = hud_height(&self.state, term_size.width);
            // context bar + hud + diff borders
            self.state.diff.viewport_height =
                term_size.height.saturating_sub(1 + hud_h + 2).max(1) as usize;

            terminal.draw(|frame| {
                let outer = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(3),
                        Constraint::Length(hud_h),
                    ])
                    .split(frame.area());

                context_bar.render(frame, outer[0], &self.state);

                let main = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
                    .split(outer[1]);

                self.nav_area.set(main[0]);
                navigator.render(frame, main[0], &self.state);
                diff_view.render(frame, main[1], &self.state);
                action_hud.render(frame, outer[2], &self.state);

                if let Some(draft) = &self.state.comment_draft {
                    render_comment_editor(frame, draft, &self.state);
                }
            })?;

            // Wait for at least one event, then drain all pending events
            // to avoid input lag from buffered scroll/key events.
            let mut pending = Vec::new();
            if let Some(ev) = events.next().await {
                pending.push(ev);
            }
            while let Some(ev) = events.try_next() {
                pending.push(ev);
            }

            // Coalesce consecutive scroll actions into net movement
            let mut scroll_delta: isize = 0;
            let mut actions: Vec<Action> = Vec::new();

            for event in pending {
                let ctx = KeyContext {
                    focus: self.state.focus,
                    search_active: self.state.navigator.search_active,
                    comment_editor_open: self.state.comment_draft.is_some(),
                };
                let action = match event {
                    Event::Key(key) => map_key_to_action(key, &ctx),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize => Some(Action::Resize),
                    Event::Tick => Some(Action::Tick),
                    Event::SchemeChanged(scheme) => Some(Action::SystemSchemeChanged(scheme)),
                };
                match action {
                    Some(Action::ScrollUp) => scroll_delta -= 1,
                    Some(Action::ScrollDown) => scroll_delta += 1,
                    Some(other) => actions.push(other),
                    None => {}
                }
            }

            if scroll_delta != 0 {
                self.state.diff.move_cursor(scroll_delta);
            }
            for action in actions {
                self.update(action);
            }

            if self.state.should_quit {
                break;
            }
        }

        self.state.theme.shutdown();
        Ok(())
    }

    /// Hand off queued review comments. Call after the terminal is restored.
    pub fn finish(&mut self) -> Result<Option<(usize, PathBuf)>> {
        let count = self.state.comments.len();
        let written = comments::write_comments(&self.repo_path, &mut self.state.comments)?;
        Ok(written.map(|path| (count, path)))
    }

    fn request_diff(&mut self) {
        self.generation += 1;
        self.state.diff.loading = true;
        self.worker.request(DiffRequest {
            generation: self.generation,
            target: self.target.clone(),
        });
    }

    fn poll_diff_results(&mut self) {
        while let Some(outcome) = self.worker.try_recv() {
            if let Some(msg) = apply_diff_outcome(&mut self.state, self.generation, outcome) {
                self.set_status(msg, true);
            }
        }
    }

    fn update(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.state.should_quit = true;
            }
            Action::Tick => {
                if self.status_clear_countdown > 0 {
                    self.status_clear_countdown -= 1;
                    if self.status_clear_countdown == 0 {
                        self.state.status_message = None;
                    }
                }
            }
            Action::Resize => {}

            Action::NavigatorUp => {
                self.state.navigator.select_up();
                self.sync_selection();
            }
            Action::NavigatorDown => {
                self.state.navigator.select_down();
                self.sync_selection();
            }
            Action::NavigatorTop => {
                self.state.navigator.select_top();
                self.sync_selection();
            }
            Action::NavigatorBottom => {
                self.state.navigator.select_bottom();
                self.sync_selection();
            }
            Action::SelectFile(idx) => {
                if self.state.navigator.select_file(idx) {
                    self.sync_selection();
                }
                self.state.focus = FocusPanel::Navigator;
            }

            Action::ScrollUp => self.state.diff.move_cursor(-1),
            Action::ScrollDown => self.state.diff.move_cursor(1),
            Action::ScrollPageUp => {
                let vh = self.state.diff.viewport_height as isize;
                self.state.diff.move_cursor(-vh);
            }
            Action::ScrollPageDown => {
                let vh = self.state.diff.viewport_height as isize;
                self.state.diff.move_cursor(vh);
            }
            Action::ScrollToTop => self.state.diff.cursor_to_top(),
            Action::ScrollToBottom => self.state.diff.cursor_to_bottom(),
            Action::ToggleSelection => self.state.diff.toggle_selection(),

            Action::FocusNavigator => {
                self.state.focus = FocusPanel::Navigator;
            }
            Action::FocusDiffView => {
                if self.state.diff.selected().is_some() {
                    self.state.focus = FocusPanel::DiffView;
                }
            }

            Action::StartSearch => {
                self.state.navigator.start_search();
                self.state.focus = FocusPanel::Navigator;
            }
            Action::ConfirmSearch => {
                self.state.navigator.confirm_search();
                self.sync_selection();
            }
            Action::CancelSearch => {
                self.state.navigator.cancel_search();
                self.sync_selection();
            }
            Action::SearchEdit(edit) => {
                self.state.navigator.edit_search(edit);
                self.sync_selection();
            }

            Action::ToggleViewed => {
                let Some(file) = self.state.diff.selected() else {
                    return;
                };
                let viewed = self.state.viewed.toggle(file);
                let msg = if viewed {
                    format!("Viewed: {}", file.path)
                } else {
                    format!("Not viewed: {}", file.path)
                };
                self.set_status(msg, false);
            }
            Action::NextUnviewed => self.select_next_unviewed(),
            Action::ClearViewed => {
                self.state.viewed.clear();
                self.set_status("Cleared viewed marks".to_string(), false);
            }

            Action::OpenCommentEditor => self.open_comment_editor(),
            Action::CommentEdit(edit) => {
                if let Some(draft) = self.state.comment_draft.as_mut() {
                    draft.text.apply(edit);
                }
            }
            Action::CancelComment => {
                self.state.comment_draft = None;
            }
            Action::ConfirmComment => {
                let Some(draft) = self.state.comment_draft.take() else {
                    return;
                };
                let text = draft.text.text();
                if text.trim().is_empty() {
                    return;
                }
                let id = self
                    .state
                    .comments
                    .enqueue(draft.anchor, draft.code_context, text);
                self.state.diff.selection_anchor = None;
                self.set_status(format!("Comment #{id} queued"), false);
            }

            Action::CycleTheme => {
                let next = self.state.theme.preference().next();
                let resolved = self.state.theme.set_preference(next);
                self.set_status(format!("Theme: {next} ({resolved})"), false);
            }
            Action::SystemSchemeChanged(scheme) => {
                self.state.theme.on_system_change(scheme);
            }

            Action::RefreshDiff => {
                self.request_diff();
                self.set_status("Refreshing".to_string(), false);
            }
            Action::ToggleHud => {
                self.state.hud_expanded = !self.state.hud_expanded;
            }
        }
    }

    /// Select the first visible file after the current one that is not
    /// viewed, wrapping around.
    fn select_next_unviewed(&mut self) {
        let files = self.state.diff.files();
        let visible = self.state.navigator.visible_entries();
        let len = visible.len();
        let current = self.state.navigator.selected;

        let next = (1..=len).map(|offset| (current + offset) % len).find(|&idx| {
            files
                .get(visible[idx].1.file_index)
                .is_some_and(|f| !self.state.viewed.is_viewed(f))
        });

        match next {
            Some(idx) => {
                self.state.navigator.selected = idx;
                self.sync_selection();
            }
            None => self.set_status("All files viewed".to_string(), false),
        }
    }

    fn open_comment_editor(&mut self) {
        if self.state.diff.selected().is_none() {
            return;
        }
        match draft_for_selection(&self.state.diff) {
            Some(draft) => self.state.comment_draft = Some(draft),
            None => {
                self.set_status("Move the cursor onto a diff line to comment".to_string(), true)
            }
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            MouseEventKind::Down(MouseButton::Left) => {
                let nav = self.nav_area.get();
                let (col, row) = (mouse.column, mouse.row);

                // Inside the navigator, excluding the border
                if col > nav.x
                    && col < nav.x + nav.width.saturating_sub(1)
                    && row > nav.y
                    && row < nav.y + nav.height.saturating_sub(1)
                {
                    let inner_height = nav.height.saturating_sub(2) as usize;
                    let scroll = scroll_offset(self.state.navigator.selected, inner_height);
                    let visible_idx = scroll + (row - nav.y - 1) as usize;
                    let visible = self.state.navigator.visible_entries();
                    return visible
                        .get(visible_idx)
                        .map(|(_, entry)| Action::SelectFile(entry.file_index));
                }
                None
            }
            _ => None,
        }
    }

    fn set_status(&mut self, msg: String, is_error: bool) {
        self.state.status_message = Some((msg, is_error));
        self.status_clear_countdown = STATUS_TICKS;
    }

    fn sync_selection(&mut self) {
        sync_selection(&mut self.state);
    }
}

fn sync_selection(state: &mut AppState) {
    if let Some(idx) = state.navigator.selected_diff_index() {
        state.diff.select(idx);
    }
}

/// Apply a worker outcome. Outcomes from before `generation` are dropped.
/// Every applied result reconciles the viewed marks against its files.
/// Returns a status message when the diff failed.
fn apply_diff_outcome(
    state: &mut AppState,
    generation: u64,
    outcome: DiffOutcome,
) -> Option<String> {
    if outcome.generation < generation {
        debug!(generation = outcome.generation, "discarding stale diff");
        return None;
    }
    state.diff.loading = false;
    match outcome.result {
        Ok(result) => {
            let dropped = state.viewed.reconcile(&result.files);
            if dropped > 0 {
                info!(dropped, "viewed marks invalidated by diff changes");
            }
            state.navigator.update_from_files(&result.files);
            state.diff.apply_result(result);
            sync_selection(state);
            None
        }
        Err(e) => {
            state.diff.result = None;
            state.diff.selected_file = None;
            state.diff.selection_anchor = None;
            state.navigator.update_from_files(&[]);
            let msg = format!("Diff failed: {e}");
            state.diff.error = Some(e);
            Some(msg)
        }
    }
}

/// Comment draft anchored to the selected line range of the current file, or
/// to the cursor line when nothing is selected. `None` when the range holds
/// no diff lines.
fn draft_for_selection(diff: &DiffState) -> Option<CommentDraft> {
    let file = diff.selected()?;
    let lines = diff.selected_lines();
    let numbers: Vec<u32> = lines
        .iter()
        .filter_map(|l| l.new_num.or(l.old_num))
        .collect();
    let start_line = *numbers.iter().min()?;
    let end_line = *numbers.iter().max()?;
    let code_context = lines
        .iter()
        .map(|l| l.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Some(CommentDraft {
        anchor: CommentAnchor {
            file: file.path.clone(),
            start_line,
            end_line,
        },
        code_context,
        text: InputBuffer::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPreferences;
    use crate::git::types::{DiffFile, DiffHunk, DiffLine, DiffResult, FileStatus, LineType};
    use crate::theme::PaletteOverrides;

    fn app_state(dir: &tempfile::TempDir) -> AppState {
        let prefs = ConfigPreferences::new(dir.path().join("config.toml"));
        AppState::new(ThemeStore::new(
            Box::new(prefs),
            PaletteSurface::new(PaletteOverrides::default()),
        ))
    }

    fn added(content: &str, n: u32) -> DiffLine {
        DiffLine {
            line_type: LineType::Add,
            content: content.to_string(),
            old_num: None,
            new_num: Some(n),
        }
    }

    fn file(path: &str, contents: &[&str]) -> DiffFile {
        DiffFile {
            path: path.to_string(),
            status: FileStatus::Added,
            old_path: None,
            hunks: vec![DiffHunk {
                old_start: 0,
                old_lines: 0,
                new_start: 1,
                new_lines: contents.len() as u32,
                lines: contents
                    .iter()
                    .enumerate()
                    .map(|(i, c)| added(c, i as u32 + 1))
                    .collect(),
            }],
        }
    }

    fn outcome(generation: u64, files: Vec<DiffFile>) -> DiffOutcome {
        DiffOutcome {
            generation,
            result: Ok(DiffResult {
                base_ref: "HEAD".into(),
                compare_ref: "working tree".into(),
                files,
            }),
        }
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);
        state.diff.loading = true;

        let status = apply_diff_outcome(&mut state, 2, outcome(1, vec![file("a.rs", &["x"])]));
        assert_eq!(status, None);
        assert!(state.diff.result.is_none());
        assert!(state.diff.loading);
        assert!(state.navigator.visible_entries().is_empty());
    }

    #[test]
    fn test_refresh_unmarks_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);

        apply_diff_outcome(
            &mut state,
            1,
            outcome(1, vec![file("a.rs", &["x"]), file("b.rs", &["y"])]),
        );
        let files = state.diff.files().to_vec();
        state.viewed.toggle(&files[0]);
        state.viewed.toggle(&files[1]);

        apply_diff_outcome(
            &mut state,
            2,
            outcome(2, vec![file("a.rs", &["x", "z"]), file("b.rs", &["y"])]),
        );
        let files = state.diff.files();
        assert!(!state.viewed.is_viewed(&files[0]));
        assert!(state.viewed.is_viewed(&files[1]));
        assert_eq!(state.viewed.len(), 1);

        // The mark was dropped, so reverting the change does not restore it.
        apply_diff_outcome(
            &mut state,
            3,
            outcome(3, vec![file("a.rs", &["x"]), file("b.rs", &["y"])]),
        );
        assert!(!state.viewed.is_viewed(&state.diff.files()[0]));
        assert_eq!(state.diff.selected_file, Some(0));
    }

    #[test]
    fn test_failed_outcome_keeps_viewed_marks() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = app_state(&dir);

        let viewed = file("a.rs", &["x"]);
        apply_diff_outcome(&mut state, 1, outcome(1, vec![viewed.clone()]));
        state.viewed.toggle(&viewed);

        let failed = DiffOutcome {
            generation: 2,
            result: Err("bad revision".into()),
        };
        let status = apply_diff_outcome(&mut state, 2, failed);
        assert_eq!(status.as_deref(), Some("Diff failed: bad revision"));
        assert_eq!(state.diff.error.as_deref(), Some("bad revision"));
        assert!(state.diff.files().is_empty());
        assert_eq!(state.viewed.len(), 1);

        apply_diff_outcome(&mut state, 3, outcome(3, vec![viewed.clone()]));
        assert!(state.viewed.is_viewed(&viewed));
    }

    #[test]
    fn test_draft_spans_selected_range() {
        let mut diff = DiffState::new();
        diff.apply_result(DiffResult {
            base_ref: "HEAD".into(),
            compare_ref: "working tree".into(),
            files: vec![file("a.rs", &["one", "two", "three"])],
        });
        // Row 0 is the hunk header.
        diff.move_cursor(1);
        let single = draft_for_selection(&diff).unwrap();
        assert_eq!((single.anchor.start_line, single.anchor.end_line), (1, 1));
        assert_eq!(single.code_context, "one");

        diff.toggle_selection();
        diff.move_cursor(2);
        let range = draft_for_selection(&diff).unwrap();
        assert_eq!(range.anchor.file, "a.rs");
        assert_eq!((range.anchor.start_line, range.anchor.end_line), (1, 3));
        assert_eq!(range.code_context, "one\ntwo\nthree");
    }

    #[test]
    fn test_no_draft_on_hunk_header() {
        let mut diff = DiffState::new();
        diff.apply_result(DiffResult {
            base_ref: "HEAD".into(),
            compare_ref: "working tree".into(),
            files: vec![file("a.rs", &["one"])],
        });
        assert!(draft_for_selection(&diff).is_none());
    }
}
