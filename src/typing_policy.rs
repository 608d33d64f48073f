use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Decide whether a key event is a printable keystroke for the session.
///
/// Control and alt chords, navigation keys, and other non-character keys
/// never reach the scoring machine.
pub fn printable_char(key: &KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }

    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(c),
        _ => None,
    }
}
