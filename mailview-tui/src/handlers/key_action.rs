//! Raw key events mapped onto what they mean to the mail view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key press, stripped down to what the handlers act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Ctrl-C, from any mode.
    Quit,
    Up,
    Down,
    PageDown,
    PageUp,
    /// Enter: open the email under the cursor, confirm, or newline in the body.
    Open,
    /// Esc: close the open email or leave the current mode.
    Back,
    Erase,
    /// Printable text, already upper-cased when Shift is held.
    Input(char),
    /// Tab: next compose field.
    FocusNext,
    /// Shift-Tab: previous compose field.
    FocusPrev,
    /// Ctrl-S: send the compose form.
    Send,
    Noop,
}

/// Ctrl chords with a meaning. Any other Ctrl chord is ignored rather than typed.
const CONTROL_CHORDS: &[(char, KeyAction)] = &[
    ('c', KeyAction::Quit),
    ('d', KeyAction::PageDown),
    ('u', KeyAction::PageUp),
    ('s', KeyAction::Send),
];

impl From<KeyEvent> for KeyAction {
    fn from(event: KeyEvent) -> Self {
        if let KeyCode::Char(c) = event.code {
            return if event.modifiers.contains(KeyModifiers::CONTROL) {
                CONTROL_CHORDS
                    .iter()
                    .find(|(key, _)| *key == c.to_ascii_lowercase())
                    .map_or(KeyAction::Noop, |(_, action)| action.clone())
            } else if event.modifiers.contains(KeyModifiers::ALT) {
                KeyAction::Noop
            } else if event.modifiers.contains(KeyModifiers::SHIFT) {
                KeyAction::Input(c.to_ascii_uppercase())
            } else {
                KeyAction::Input(c)
            };
        }

        match event.code {
            KeyCode::Up => KeyAction::Up,
            KeyCode::Down => KeyAction::Down,
            KeyCode::PageDown => KeyAction::PageDown,
            KeyCode::PageUp => KeyAction::PageUp,
            KeyCode::Enter => KeyAction::Open,
            KeyCode::Esc => KeyAction::Back,
            KeyCode::Backspace => KeyAction::Erase,
            KeyCode::Tab => KeyAction::FocusNext,
            KeyCode::BackTab => KeyAction::FocusPrev,
            _ => KeyAction::Noop,
        }
    }
}
