use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::action::Action;
use crate::state::app_state::FocusPanel;
use crate::state::input_buffer::Edit;
use crate::theme::ColorScheme;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
    /// The OS color scheme changed.
    SchemeChanged(ColorScheme),
}

pub struct EventReader {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReader {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let event_tx = tx.clone();
        tokio::spawn(async move {
            let mut reader = EventStream::new();
            loop {
                let event = match reader.next().await {
                    Some(Ok(CrosstermEvent::Key(key))) if key.kind != KeyEventKind::Release => {
                        Event::Key(key)
                    }
                    Some(Ok(CrosstermEvent::Mouse(mouse))) => Event::Mouse(mouse),
                    Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                    Some(Err(_)) | None => break,
                    _ => continue,
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            loop {
                interval.tick().await;
                if tick_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Handle for producers outside the terminal, such as the OS scheme
    /// listener.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Non-blocking: returns a pending event if one is available, or None.
    pub fn try_next(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

/// All context needed to map a key event to an action.
pub struct KeyContext {
    pub focus: FocusPanel,
    pub search_active: bool,
    pub comment_editor_open: bool,
}

/// Line-editing keys shared by the comment editor and the navigator filter.
fn edit_for_key(key: KeyEvent) -> Option<Edit> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if ctrl => Some(Edit::DeleteWord),
        KeyCode::Char('a') if ctrl => Some(Edit::Home),
        KeyCode::Char('e') if ctrl => Some(Edit::End),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Edit::Insert(c)),
        KeyCode::Backspace => Some(Edit::Backspace),
        KeyCode::Left => Some(Edit::Left),
        KeyCode::Right => Some(Edit::Right),
        KeyCode::Home => Some(Edit::Home),
        KeyCode::End => Some(Edit::End),
        _ => None,
    }
}

/// Map a key event to an action based on current app context.
pub fn map_key_to_action(key: KeyEvent, ctx: &KeyContext) -> Option<Action> {
    // Ctrl-C always quits, even inside the editor
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if ctx.comment_editor_open {
        return match key.code {
            KeyCode::Esc => Some(Action::CancelComment),
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                Some(Action::CommentEdit(Edit::Insert('\n')))
            }
            KeyCode::Enter => Some(Action::ConfirmComment),
            _ => edit_for_key(key).map(Action::CommentEdit),
        };
    }

    if ctx.search_active {
        return match key.code {
            KeyCode::Esc => Some(Action::CancelSearch),
            KeyCode::Enter => Some(Action::ConfirmSearch),
            KeyCode::Up => Some(Action::NavigatorUp),
            KeyCode::Down => Some(Action::NavigatorDown),
            _ => edit_for_key(key).map(Action::SearchEdit),
        };
    }

    // Global bindings
    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('/') => return Some(Action::StartSearch),
        KeyCode::Char('v') | KeyCode::Char(' ') => return Some(Action::ToggleViewed),
        KeyCode::Char('n') => return Some(Action::NextUnviewed),
        KeyCode::Char('U') => return Some(Action::ClearViewed),
        KeyCode::Char('R') => return Some(Action::RefreshDiff),
        KeyCode::Char('T') => return Some(Action::CycleTheme),
        KeyCode::Char('?') => return Some(Action::ToggleHud),
        _ => {}
    }

    match ctx.focus {
        FocusPanel::Navigator => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::NavigatorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::NavigatorDown),
            KeyCode::Char('g') => Some(Action::NavigatorTop),
            KeyCode::Char('G') => Some(Action::NavigatorBottom),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => Some(Action::FocusDiffView),
            _ => None,
        },
        FocusPanel::DiffView => match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
            KeyCode::Char('g') => Some(Action::ScrollToTop),
            KeyCode::Char('G') => Some(Action::ScrollToBottom),
            KeyCode::PageUp => Some(Action::ScrollPageUp),
            KeyCode::PageDown => Some(Action::ScrollPageDown),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Esc => Some(Action::FocusNavigator),
            KeyCode::Char('V') => Some(Action::ToggleSelection),
            KeyCode::Char('i') => Some(Action::OpenCommentEditor),
            _ => None,
        },
    }
}
