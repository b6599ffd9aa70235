use crate::core::KeyCode;

/// Converts a terminal key event into the code routed through the focus chain.
///
/// Releases are dropped so a key reaches the views once per press.
pub fn into_key_code(event: crossterm::event::KeyEvent) -> Option<KeyCode> {
    if event.kind == crossterm::event::KeyEventKind::Release {
        return None;
    }
    Some(convert_code(event.code))
}

/// Ctrl+C, which terminals in raw mode deliver as a plain key event.
pub fn is_interrupt(event: &crossterm::event::KeyEvent) -> bool {
    event.code == crossterm::event::KeyCode::Char('c')
        && event
            .modifiers
            .contains(crossterm::event::KeyModifiers::CONTROL)
}

fn convert_code(code: crossterm::event::KeyCode) -> KeyCode {
    match code {
        crossterm::event::KeyCode::Char(ch) => KeyCode::Char(ch),
        crossterm::event::KeyCode::Enter => KeyCode::Enter,
        crossterm::event::KeyCode::Tab => KeyCode::Tab,
        crossterm::event::KeyCode::BackTab => KeyCode::BackTab,
        crossterm::event::KeyCode::Esc => KeyCode::Esc,
        crossterm::event::KeyCode::Backspace => KeyCode::Backspace,
        crossterm::event::KeyCode::Delete => KeyCode::Delete,
        crossterm::event::KeyCode::Up => KeyCode::Up,
        crossterm::event::KeyCode::Down => KeyCode::Down,
        crossterm::event::KeyCode::Left => KeyCode::Left,
        crossterm::event::KeyCode::Right => KeyCode::Right,
        crossterm::event::KeyCode::Home => KeyCode::Home,
        crossterm::event::KeyCode::End => KeyCode::End,
        crossterm::event::KeyCode::PageUp => KeyCode::PageUp,
        crossterm::event::KeyCode::PageDown => KeyCode::PageDown,
        crossterm::event::KeyCode::F(n) => KeyCode::F(n),
        _ => KeyCode::Unknown,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/crossterm.rs"]
mod tests;
