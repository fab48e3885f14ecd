use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys reduced to what the screens react to. Letters stay `Input` so text
/// fields can receive them; screens interpret shortcuts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    NextField,
    Submit,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Input(char),
    None,
}

pub fn map_key(key: KeyEvent) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => AppAction::Quit,
            _ => AppAction::None,
        };
    }

    match key.code {
        KeyCode::Esc => AppAction::Cancel,
        KeyCode::Tab | KeyCode::BackTab => AppAction::NextField,
        KeyCode::Enter => AppAction::Submit,
        KeyCode::Backspace => AppAction::Backspace,
        KeyCode::Up => AppAction::Up,
        KeyCode::Down => AppAction::Down,
        KeyCode::Left => AppAction::Left,
        KeyCode::Right => AppAction::Right,
        KeyCode::Char(ch) => AppAction::Input(ch),
        _ => AppAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn only_ctrl_c_quits() {
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            AppAction::Quit
        );
        assert_eq!(map_key(key(KeyCode::Char('q'))), AppAction::Input('q'));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            AppAction::None
        );
    }

    #[test]
    fn arrows_and_editing_keys() {
        assert_eq!(map_key(key(KeyCode::Left)), AppAction::Left);
        assert_eq!(map_key(key(KeyCode::Right)), AppAction::Right);
        assert_eq!(map_key(key(KeyCode::Esc)), AppAction::Cancel);
        assert_eq!(map_key(key(KeyCode::Enter)), AppAction::Submit);
        assert_eq!(map_key(key(KeyCode::Backspace)), AppAction::Backspace);
    }
}
