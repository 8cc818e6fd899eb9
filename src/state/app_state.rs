use crate::theme::{PaletteSurface, ThemeStore};

use super::comment_queue::CommentAnchor;
use super::input_buffer::InputBuffer;
use super::{CommentQueue, DiffState, NavigatorState, ViewedFiles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPanel {
    Navigator,
    DiffView,
}

/// An open comment editor, anchored to the line it was opened on.
#[derive(Debug)]
pub struct CommentDraft {
    pub anchor: CommentAnchor,
    pub code_context: String,
    pub text: InputBuffer,
}

pub struct AppState {
    pub focus: FocusPanel,
    pub diff: DiffState,
    pub navigator: NavigatorState,
    pub viewed: ViewedFiles,
    pub theme: ThemeStore<PaletteSurface>,
    pub comments: CommentQueue,
    pub comment_draft: Option<CommentDraft>,
    pub status_message: Option<(String, bool)>, // (message, is_error)
    pub hud_expanded: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(theme: ThemeStore<PaletteSurface>) -> Self {
        Self {
            focus: FocusPanel::Navigator,
            diff: DiffState::new(),
            navigator: NavigatorState::new(),
            viewed: ViewedFiles::new(),
            theme,
            comments: CommentQueue::new(),
            comment_draft: None,
            status_message: None,
            hud_expanded: false,
            should_quit: false,
        }
    }
}
