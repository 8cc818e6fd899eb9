use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::git::types::{DiffFile, DiffLine, FileStatus, LineType};
use crate::state::diff_state::{display_rows, DiffRow};
use crate::state::{app_state::FocusPanel, AppState};
use crate::theme::Palette;

use super::Component;

const GUTTER_WIDTH: usize = 5;

pub struct DiffView;

impl Component for DiffView {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let is_focused = state.focus == FocusPanel::DiffView;
        let palette = state.theme.surface().palette();

        let border_style = if is_focused {
            Style::default().fg(palette.accent)
        } else {
            Style::default().fg(palette.text_muted)
        };

        let Some(file) = state.diff.selected() else {
            let block = Block::default()
                .title(" Diff ")
                .borders(Borders::ALL)
                .border_style(border_style);

            let content = if state.diff.loading {
                " Loading..."
            } else if state.diff.error.is_some() {
                " Diff failed"
            } else if state.diff.files().is_empty() {
                " No changes detected"
            } else {
                " Select a file to view diff"
            };

            let paragraph = Paragraph::new(content)
                .style(Style::default().fg(palette.text_muted))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let block = Block::default()
            .title(format_title(file, state))
            .borders(Borders::ALL)
            .border_style(border_style);

        if file.hunks.is_empty() {
            let msg = Paragraph::new(" Binary file differs")
                .style(Style::default().fg(palette.text_muted))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let (sel_start, sel_end) = state.diff.selected_rows();
        let has_selection = state.diff.selection_anchor.is_some();

        let lines: Vec<Line> = display_rows(file)
            .into_iter()
            .enumerate()
            .skip(state.diff.scroll_offset)
            .take(inner.height as usize)
            .map(|(row, diff_row)| {
                let cursor = is_focused && row == state.diff.cursor_row;
                let selected = has_selection && (sel_start..=sel_end).contains(&row);
                match diff_row {
                    DiffRow::HunkHeader(hunk) => {
                        hunk_header_line(&hunk.header(), cursor, palette)
                    }
                    DiffRow::Line(line) => {
                        let commented = line
                            .new_num
                            .or(line.old_num)
                            .is_some_and(|n| state.comments.has_comment_at(&file.path, n));
                        diff_line(line, cursor, selected, commented, palette)
                    }
                }
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn format_title(file: &DiffFile, state: &AppState) -> String {
    let name = match (&file.status, &file.old_path) {
        (FileStatus::Renamed, Some(old)) => format!("{old} \u{2192} {}", file.path),
        _ => file.path.clone(),
    };
    let viewed = if state.viewed.is_viewed(file) {
        " \u{2713} viewed"
    } else {
        ""
    };
    format!(" {name} [{}]{viewed} ", file.status.label())
}

fn format_lineno(lineno: Option<u32>) -> String {
    match lineno {
        Some(n) => format!("{n:>GUTTER_WIDTH$}"),
        None => " ".repeat(GUTTER_WIDTH),
    }
}

fn gutter_style(cursor: bool, palette: &Palette) -> Style {
    if cursor {
        Style::default().fg(Color::Black).bg(palette.accent)
    } else {
        Style::default().fg(palette.text_muted)
    }
}

fn hunk_header_line<'a>(header: &str, cursor: bool, palette: &Palette) -> Line<'a> {
    let gutter = format!("{:>w$} ", "...", w = GUTTER_WIDTH * 2 + 1);
    Line::from(vec![
        Span::styled(gutter, gutter_style(cursor, palette)),
        Span::styled(
            header.to_string(),
            Style::default()
                .fg(palette.diff_hunk_header_fg)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn diff_line<'a>(
    line: &DiffLine,
    cursor: bool,
    selected: bool,
    commented: bool,
    palette: &Palette,
) -> Line<'a> {
    let marker = if commented { "\u{2502}" } else { " " };
    let gutter = format!(
        "{} {}{marker}",
        format_lineno(line.old_num),
        format_lineno(line.new_num)
    );

    let (fg, bg) = match line.line_type {
        LineType::Add => (palette.diff_add_fg, Some(palette.diff_add_bg)),
        LineType::Delete => (palette.diff_del_fg, Some(palette.diff_del_bg)),
        LineType::Context => (palette.diff_context_fg, None),
    };
    let mut content_style = Style::default().fg(fg);
    if let Some(bg) = bg {
        content_style = content_style.bg(bg);
    }
    if cursor {
        content_style = content_style.bg(palette.cursor_line_bg);
    } else if selected {
        content_style = content_style.bg(palette.selection_bg);
    }

    Line::from(vec![
        Span::styled(gutter, gutter_style(cursor, palette)),
        Span::styled(
            format!("{}{}", line.line_type.tag(), line.content.replace('\t', "    ")),
            content_style,
        ),
    ])
}
