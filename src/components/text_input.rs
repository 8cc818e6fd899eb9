use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::state::input_buffer::InputBuffer;

/// Wrap `text` into rows of at most `width` chars, honoring embedded
/// newlines. Returns the rows and the (row, col) of char index `cursor`.
fn layout_rows(text: &str, width: usize, cursor: usize) -> (Vec<String>, (usize, usize)) {
    let mut rows: Vec<String> = vec![String::new()];
    let mut cursor_pos = (0, 0);
    let mut col = 0;

    for (i, c) in text.chars().enumerate() {
        if i == cursor {
            cursor_pos = (rows.len() - 1, col);
        }
        if c == '\n' {
            rows.push(String::new());
            col = 0;
            continue;
        }
        if col == width {
            rows.push(String::new());
            col = 0;
            if i == cursor {
                cursor_pos = (rows.len() - 1, 0);
            }
        }
        if let Some(row) = rows.last_mut() {
            row.push(c);
        }
        col += 1;
    }

    if cursor >= text.chars().count() {
        if col == width {
            rows.push(String::new());
            col = 0;
        }
        cursor_pos = (rows.len() - 1, col);
    }
    (rows, cursor_pos)
}

/// Render a text input that wraps and scrolls so the cursor stays visible.
pub fn render_text_input(frame: &mut Frame, area: Rect, input: &InputBuffer, style: Style) {
    if area.width < 3 || area.height == 0 {
        return;
    }

    // 1 char left padding, 1 char for the cursor at end of line
    let inner_width = (area.width as usize).saturating_sub(2);
    let (rows, (cursor_row, cursor_col)) = layout_rows(&input.text(), inner_width, input.cursor());

    let visible_height = area.height as usize;
    let scroll = (cursor_row + 1).saturating_sub(visible_height);
    let cursor_style = style.add_modifier(Modifier::REVERSED);

    let display_lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible_height)
        .map(|(i, row)| {
            if i != cursor_row {
                return Line::from(Span::styled(format!(" {row}"), style));
            }
            let before: String = row.chars().take(cursor_col).collect();
            let at: String = row.chars().nth(cursor_col).map_or(" ".into(), String::from);
            let after: String = row.chars().skip(cursor_col + 1).collect();
            Line::from(vec![
                Span::styled(format!(" {before}"), style),
                Span::styled(at, cursor_style),
                Span::styled(after, style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(display_lines), area);
}
