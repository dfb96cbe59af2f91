use fltk::{app, enums::{EventState, Key}};

use crate::app::controllers::hotkeys::KeyInput;

/// Translate the current FLTK key-down into a key identity.
pub fn current_key() -> KeyInput {
    let state = app::event_state();
    let modified = state.contains(EventState::Ctrl)
        || state.contains(EventState::Alt)
        || state.contains(EventState::Meta);
    key_input(app::event_key(), &app::event_text(), modified)
}

/// Chords with Ctrl/Alt/Meta never map to a practice hotkey.
pub fn key_input(key: Key, text: &str, modified: bool) -> KeyInput {
    if modified {
        return KeyInput::Other;
    }
    if key == Key::Left {
        return KeyInput::Left;
    }
    if key == Key::Right {
        return KeyInput::Right;
    }
    if key == Key::from_char(' ') {
        return KeyInput::Space;
    }

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => KeyInput::Char(c),
        _ => KeyInput::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_and_space() {
        assert_eq!(key_input(Key::Left, "", false), KeyInput::Left);
        assert_eq!(key_input(Key::Right, "", false), KeyInput::Right);
        assert_eq!(key_input(Key::from_char(' '), " ", false), KeyInput::Space);
    }

    #[test]
    fn test_text_keys_keep_case() {
        assert_eq!(key_input(Key::from_char('h'), "H", false), KeyInput::Char('H'));
        assert_eq!(key_input(Key::from_char('2'), "2", false), KeyInput::Char('2'));
    }

    #[test]
    fn test_modified_and_control_keys_are_other() {
        assert_eq!(key_input(Key::from_char('d'), "d", true), KeyInput::Other);
        assert_eq!(key_input(Key::Escape, "\u{1b}", false), KeyInput::Other);
        assert_eq!(key_input(Key::Up, "", false), KeyInput::Other);
    }
}
