//! Keyboard mapping

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Menu inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Confirm,
    Cancel,
    /// Only meaningful while a dialog is open
    Dismiss,
}

impl Input {
    /// Map a terminal key press. Releases, repeats of other kinds, and
    /// unbound keys map to `None`.
    pub fn from_key(key: &KeyEvent) -> Option<Input> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Up => Some(Input::Up),
            KeyCode::Down => Some(Input::Down),
            KeyCode::Enter => Some(Input::Confirm),
            KeyCode::Esc => Some(Input::Cancel),
            KeyCode::Char(' ') => Some(Input::Dismiss),
            _ => None,
        }
    }
}

/// Ctrl+C leaves the program no matter what the menu is doing
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.code == KeyCode::Char('c')
}
