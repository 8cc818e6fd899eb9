use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::git::types::WORKING_TREE;
use crate::state::AppState;

use super::Component;

pub struct ContextBar;

impl Component for ContextBar {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let palette = state.theme.surface().palette();

        let (base, compare) = match &state.diff.result {
            Some(result) => (result.base_ref.as_str(), result.compare_ref.as_str()),
            None => ("\u{2026}", WORKING_TREE),
        };

        let progress = state.viewed.viewed_count(state.diff.files());
        let progress_color = if progress.total > 0 && progress.viewed == progress.total {
            palette.success
        } else {
            palette.text_muted
        };

        let mut spans = vec![
            Span::styled(
                " differ ",
                Style::default().fg(palette.surface).bg(palette.accent),
            ),
            Span::raw("  "),
            Span::styled(
                base.to_string(),
                Style::default()
                    .fg(palette.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" \u{2192} ", Style::default().fg(palette.text_muted)),
            Span::styled(
                compare.to_string(),
                Style::default()
                    .fg(palette.warning)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[{}/{} viewed]", progress.viewed, progress.total),
                Style::default().fg(progress_color),
            ),
            Span::raw(" "),
            Span::styled(
                format!(
                    "[theme: {} ({})]",
                    state.theme.preference(),
                    state.theme.resolved()
                ),
                Style::default().fg(palette.text_muted),
            ),
        ];

        if state.diff.loading {
            spans.push(Span::styled(
                "  loading\u{2026}",
                Style::default().fg(palette.text_muted),
            ));
        }

        let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.bar_bg));
        frame.render_widget(bar, area);
    }
}
