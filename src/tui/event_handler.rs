use super::app_logic::TuiApp;
use crate::selection::{Action, Mode};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    if event::poll(POLL_INTERVAL)? {
        // Resize needs no handling: the next draw measures the new area.
        if let Event::Key(key_event) = event::read()?
            && key_event.kind == KeyEventKind::Press
            && let Some(action) = map_key(app.model.mode(), key_event, app.page_size())
        {
            app.dispatch(action)?;
        }
    }
    app.tick()
}

/// Decode a key press into a model action for the current mode.
pub(super) fn map_key(mode: &Mode, key_event: KeyEvent, page: isize) -> Option<Action> {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        return match (mode, key_event.code) {
            (_, KeyCode::Char('c' | 'q')) => Some(Action::Quit),
            (Mode::Filter { .. }, KeyCode::Char('j')) => Some(Action::Move(1)),
            (Mode::Filter { .. }, KeyCode::Char('k')) => Some(Action::Move(-1)),
            (Mode::Filter { .. }, KeyCode::Char('m')) => Some(Action::ToggleFocused),
            (Mode::Filter { .. }, KeyCode::Char('y')) => Some(Action::Confirm),
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Up => return Some(Action::Move(-1)),
        KeyCode::Down => return Some(Action::Move(1)),
        KeyCode::PageUp => return Some(Action::Move(-page)),
        KeyCode::PageDown => return Some(Action::Move(page)),
        KeyCode::Home => return Some(Action::MoveToFirst),
        KeyCode::End => return Some(Action::MoveToLast),
        _ => {}
    }

    match mode {
        Mode::Browse => match key_event.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') => Some(Action::Move(1)),
            KeyCode::Char('k') => Some(Action::Move(-1)),
            KeyCode::Char('g') => Some(Action::MoveToFirst),
            KeyCode::Char('G') => Some(Action::MoveToLast),
            KeyCode::Char(' ' | 'm') => Some(Action::ToggleFocused),
            KeyCode::Char('c' | 'C') => Some(Action::ClearAll),
            KeyCode::Char('.') => Some(Action::ToggleShowHidden),
            KeyCode::Char('/') => Some(Action::StartFilter),
            KeyCode::Char('y') | KeyCode::Enter => Some(Action::Confirm),
            _ => None,
        },
        Mode::Filter { .. } => match key_event.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Enter => Some(Action::ToggleFocused),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
    }
}
