use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::state::{app_state::FocusPanel, AppState};

use super::Component;

pub struct Navigator;

/// Rows scrolled off the top so `selected` stays visible.
pub fn scroll_offset(selected: usize, inner_height: usize) -> usize {
    if selected >= inner_height {
        selected - inner_height + 1
    } else {
        0
    }
}

impl Component for Navigator {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let is_focused = state.focus == FocusPanel::Navigator;
        let palette = state.theme.surface().palette();

        let border_style = if is_focused {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.text_muted)
        };

        let visible = state.navigator.visible_entries();
        let total = visible.len();

        let title = if state.navigator.search_active {
            format!(" /{} ", state.navigator.search_query)
        } else {
            format!(" Files ({total}) ")
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        if visible.is_empty() {
            let msg = if state.navigator.search_active {
                " No matches"
            } else if let Some(err) = &state.diff.error {
                err.as_str()
            } else {
                " No changes"
            };
            let paragraph = Paragraph::new(msg)
                .style(Style::default().fg(palette.text_muted))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(2) as usize;
        // "▶ " + "✓ "
        let max_display_width = inner_width.saturating_sub(4);
        let selected = state.navigator.selected;
        let files = state.diff.files();

        let lines: Vec<Line> = visible
            .iter()
            .enumerate()
            .skip(scroll_offset(selected, inner_height))
            .take(inner_height)
            .map(|(vis_idx, (_entry_idx, entry))| {
                let is_selected = vis_idx == selected;
                let is_active = state.diff.selected_file == Some(entry.file_index);

                let style = if is_selected {
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD)
                        .bg(palette.selection_bg)
                } else if is_active {
                    Style::default()
                        .fg(palette.text)
                        .bg(palette.selection_inactive_bg)
                } else {
                    Style::default().fg(palette.text)
                };

                let prefix = if is_selected { "\u{25b6}" } else { " " };

                let viewed = files
                    .get(entry.file_index)
                    .is_some_and(|f| state.viewed.is_viewed(f));
                let (icon, icon_color) = if viewed {
                    ("\u{2713}", palette.success) // ✓
                } else {
                    ("\u{25cb}", palette.text_muted) // ○
                };

                // Truncate from the left so the filename stays visible
                let char_count = entry.display.chars().count();
                let display = if char_count > max_display_width && max_display_width > 1 {
                    let skip = char_count - (max_display_width - 1);
                    let truncated: String = entry.display.chars().skip(skip).collect();
                    format!("\u{2026}{truncated}")
                } else {
                    entry.display.clone()
                };

                Line::from(vec![
                    Span::styled(format!("{prefix} "), style),
                    Span::styled(format!("{icon} "), Style::default().fg(icon_color)),
                    Span::styled(display, style),
                ])
            })
            .collect();

        let scroll_info = if total > inner_height {
            format!(" {}/{} ", selected + 1, total)
        } else {
            String::new()
        };

        let block = block.title_bottom(Line::from(scroll_info).right_aligned());
        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, area);
    }
}
