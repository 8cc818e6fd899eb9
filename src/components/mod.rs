pub mod action_hud;
pub mod comment_editor;
pub mod context_bar;
pub mod diff_view;
pub mod navigator;
pub mod text_input;

use ratatui::{layout::Rect, Frame};

use crate::state::AppState;

/// Trait for renderable TUI components.
pub trait Component {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);
}
