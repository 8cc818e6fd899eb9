use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::state::app_state::FocusPanel;
use crate::state::AppState;

use super::Component;

pub struct ActionHud;

fn bindings(state: &AppState) -> &'static [(&'static str, &'static str)] {
    if state.hud_expanded {
        return &[
            ("q", "quit"),
            ("j/k", "move"),
            ("g/G", "top/bottom"),
            ("/", "filter"),
            ("Enter/l", "open"),
            ("h", "back"),
            ("PgUp/PgDn", "page"),
            ("v/Space", "viewed"),
            ("n", "next unviewed"),
            ("U", "clear viewed"),
            ("V", "select lines"),
            ("i", "comment"),
            ("R", "refresh"),
            ("T", "theme"),
            ("?", "less"),
        ];
    }
    match state.focus {
        FocusPanel::Navigator => &[
            ("q", "quit"),
            ("j/k", "nav"),
            ("/", "filter"),
            ("v", "viewed"),
            ("n", "next"),
            ("T", "theme"),
            ("?", "more"),
        ],
        FocusPanel::DiffView => &[
            ("q", "quit"),
            ("j/k", "scroll"),
            ("h", "files"),
            ("V", "select"),
            ("i", "comment"),
            ("v", "viewed"),
            ("n", "next"),
            ("?", "more"),
        ],
    }
}

/// Rows the HUD needs at `width`.
pub fn hud_height(state: &AppState, width: u16) -> u16 {
    if state.status_message.is_some() || !state.hud_expanded {
        return 1;
    }
    let total: usize = bindings(state)
        .iter()
        .map(|(key, desc)| key.len() + desc.len() + 3)
        .sum();
    (total / width.max(1) as usize + 1).min(4) as u16
}

impl Component for ActionHud {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let palette = state.theme.surface().palette();

        if let Some((ref msg, is_error)) = state.status_message {
            let color = if is_error {
                palette.error
            } else {
                palette.success
            };
            let bar = Paragraph::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(msg.as_str(), Style::default().fg(color)),
            ]))
            .style(Style::default().bg(palette.bar_bg));
            frame.render_widget(bar, area);
            return;
        }

        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in bindings(state).iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                format!("[{key}]"),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                (*desc).to_string(),
                Style::default().fg(palette.text_muted),
            ));
        }

        let pending = state.comments.len();
        if pending > 0 {
            let text = format!(" {pending} comments ");
            let used: usize = spans.iter().map(|s| s.width()).sum();
            let remaining = (area.width as usize).saturating_sub(used + text.len());
            if remaining > 0 {
                spans.push(Span::raw(" ".repeat(remaining)));
                spans.push(Span::styled(
                    text,
                    Style::default()
                        .fg(palette.warning)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }

        let bar = Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: false })
            .style(Style::default().bg(palette.bar_bg));
        frame.render_widget(bar, area);
    }
}
