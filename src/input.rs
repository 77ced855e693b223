use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::content::Mode;
use crate::engine::InputEvent;
use crate::session::Session;

/// Keys shown next to ORDERED words, one per display slot
pub const WORD_LABELS: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r',
    's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0',
];

/// What a key press asks of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(InputEvent),
    Quit,
}

pub fn label_for(slot: usize) -> Option<char> {
    WORD_LABELS.get(slot).copied()
}

pub fn slot_for(label: char) -> Option<usize> {
    let label = label.to_ascii_lowercase();
    WORD_LABELS.iter().position(|&c| c == label)
}

/// Translate a key press into an action for the current session.
///
/// `word_order[slot]` is the sentence index of the word displayed in `slot`.
pub fn map_key(key: KeyEvent, session: &Session, word_order: &[usize]) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Some(Action::Quit),
        KeyCode::Char('c') if ctrl => return Some(Action::Quit),
        KeyCode::Char('r') if ctrl => return Some(Action::Game(InputEvent::Restart)),
        _ if ctrl => return None,
        _ => {}
    }

    if session.is_over() {
        return match key.code {
            KeyCode::Enter | KeyCode::Char('r') => Some(Action::Game(InputEvent::Restart)),
            _ => None,
        };
    }

    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let event = match session.mode() {
        Mode::Ordered => {
            let index = slot_for(c).and_then(|slot| word_order.get(slot).copied())?;
            InputEvent::ClickWord(index)
        }
        Mode::Pool => InputEvent::ClickTile(session.first_available_tile(c)?),
    };
    Some(Action::Game(event))
}
