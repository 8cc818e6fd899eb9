use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::text_input::render_text_input;
use crate::state::app_state::CommentDraft;
use crate::state::AppState;

pub fn render_comment_editor(frame: &mut Frame, draft: &CommentDraft, state: &AppState) {
    let palette = state.theme.surface().palette();
    let area = frame.area();
    let dialog_width = 60.min(area.width.saturating_sub(4));
    let dialog_height = 12.min(area.height.saturating_sub(4));

    let x = (area.width.saturating_sub(dialog_width)) / 2;
    let y = (area.height.saturating_sub(dialog_height)) / 2;
    let dialog_area = Rect::new(x, y, dialog_width, dialog_height);

    frame.render_widget(Clear, dialog_area);

    let anchor = &draft.anchor;
    let title = if anchor.start_line == anchor.end_line {
        format!(" Comment {}:{} ", anchor.file, anchor.start_line)
    } else {
        format!(
            " Comment {}:{}-{} ",
            anchor.file, anchor.start_line, anchor.end_line
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.secondary))
        .style(Style::default().bg(palette.surface));

    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // code context
            Constraint::Min(3),    // text area
            Constraint::Length(1), // hints
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(format!(" {}", draft.code_context.trim_end()))
            .style(Style::default().fg(palette.text_muted)),
        rows[0],
    );

    render_text_input(frame, rows[1], &draft.text, Style::default().fg(palette.text));

    let key_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(palette.text_muted);
    let hints = Line::from(vec![
        Span::styled(" [Enter]", key_style),
        Span::styled("queue  ", desc_style),
        Span::styled("[S-Enter]", key_style),
        Span::styled("newline  ", desc_style),
        Span::styled("[Esc]", key_style),
        Span::styled("cancel", desc_style),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[2]);
}
