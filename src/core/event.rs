//! Raw key codes routed to the focused view.
//!
//! Frontends translate their native key events into [`KeyCode`] before calling
//! `UiManager::handle_key`, so the kernel never depends on a terminal crate.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Unknown,
}

impl KeyCode {
    pub fn is_char(&self) -> bool {
        matches!(self, KeyCode::Char(_))
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            KeyCode::Char(ch) => Some(*ch),
            _ => None,
        }
    }

    /// Keys that conventionally dismiss the top-most view.
    pub fn is_cancel(&self) -> bool {
        matches!(self, KeyCode::Esc | KeyCode::Backspace)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core/event.rs"]
mod tests;
