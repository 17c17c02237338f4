use crate::{
    game::{Phase, Snapshot},
    words::Letter,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Position, Rect};

/// What a raw input asks the minigame to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Guess(Letter),
    /// Continue/retry after a pause (keyboard).
    ContinueDebounced,
    /// Continue/retry right away (on-screen button).
    Continue,
    Exit,
}

/// Routes a keypress. Plain letters are consumed by the game; `Ctrl` and `Alt`
/// chords are left to the terminal, and only `Esc` and `Ctrl-C` reach the host.
pub fn route_key(key: KeyEvent, snapshot: &Snapshot) -> Option<Command> {
    match key.code {
        KeyCode::Esc => return Some(Command::Exit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(Command::Exit)
        }
        _ => {}
    }
    match snapshot.phase {
        Phase::Loading => None,
        Phase::Playing if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            None
        }
        Phase::Playing => match key.code {
            KeyCode::Char(ch) => Letter::from_key(ch).map(Command::Guess),
            _ => None,
        },
        Phase::Won | Phase::Lost if !snapshot.transitioning => Some(Command::ContinueDebounced),
        Phase::Won | Phase::Lost => None,
    }
}

pub const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

const KEY_WIDTH: u16 = 3;
const KEY_SPACING: u16 = 1;

/// Whether the on-screen button for `letter` accepts clicks.
pub fn key_enabled(letter: Letter, snapshot: &Snapshot) -> bool {
    snapshot.phase == Phase::Playing
        && !snapshot.transitioning
        && !snapshot.guessed.contains(letter)
}

/// Geometry of the on-screen keyboard and the continue button, as last drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    keys: Vec<(Letter, Rect)>,
    continue_button: Option<Rect>,
}

impl Keyboard {
    /// Lays the QWERTY rows out centred in `area`, one line per row.
    pub fn layout(area: Rect) -> Self {
        let mut keys = Vec::with_capacity(26);
        for (row, letters) in KEYBOARD_ROWS.iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.bottom() {
                break;
            }
            let count = letters.len() as u16;
            let width = count * KEY_WIDTH + (count - 1) * KEY_SPACING;
            let left = area.x + area.width.saturating_sub(width) / 2;
            for (i, ch) in letters.chars().enumerate() {
                let x = left + i as u16 * (KEY_WIDTH + KEY_SPACING);
                let rect = Rect::new(x, y, KEY_WIDTH, 1).intersection(area);
                if !rect.is_empty() {
                    keys.push((Letter::new(ch), rect));
                }
            }
        }
        Self {
            keys,
            continue_button: None,
        }
    }

    pub fn with_continue_button(mut self, button: Option<Rect>) -> Self {
        self.continue_button = button;
        self
    }

    pub fn keys(&self) -> &[(Letter, Rect)] {
        &self.keys
    }

    pub fn continue_button(&self) -> Option<Rect> {
        self.continue_button
    }

    pub fn key_at(&self, column: u16, row: u16) -> Option<Letter> {
        let position = Position { x: column, y: row };
        self.keys
            .iter()
            .find(|(_, rect)| rect.contains(position))
            .map(|&(letter, _)| letter)
    }

    /// Routes a left click at the given cell.
    pub fn route_click(&self, column: u16, row: u16, snapshot: &Snapshot) -> Option<Command> {
        if let Some(letter) = self.key_at(column, row) {
            return Some(Command::Guess(letter));
        }
        let position = Position { x: column, y: row };
        let on_button = self.continue_button.is_some_and(|b| b.contains(position));
        (on_button && snapshot.phase.is_over() && !snapshot.transitioning)
            .then_some(Command::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::Game, words::LetterSet};
    use crossterm::event::KeyEventKind;

    fn snapshot(phase: Phase, transitioning: bool) -> Snapshot {
        Snapshot {
            phase,
            transitioning,
            ..Game::new(0).snapshot(false)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_letters_normalized_while_playing() {
        let playing = snapshot(Phase::Playing, false);
        assert_eq!(
            route_key(key(KeyCode::Char('q')), &playing),
            Some(Command::Guess(Letter::new('Q')))
        );
        assert_eq!(
            route_key(key(KeyCode::Char('Q')), &playing),
            Some(Command::Guess(Letter::new('Q')))
        );
        assert_eq!(route_key(key(KeyCode::Char('7')), &playing), None);
        assert_eq!(route_key(key(KeyCode::Enter), &playing), None);
    }

    #[test]
    fn test_chords_are_not_guesses() {
        let playing = snapshot(Phase::Playing, false);
        let chord = |modifiers| KeyEvent::new(KeyCode::Char('x'), modifiers);
        assert_eq!(route_key(chord(KeyModifiers::ALT), &playing), None);
        assert_eq!(route_key(chord(KeyModifiers::CONTROL), &playing), None);
        assert_eq!(
            route_key(chord(KeyModifiers::SHIFT), &playing),
            Some(Command::Guess(Letter::new('X')))
        );
    }

    #[test]
    fn test_loading_ignores_input() {
        let loading = snapshot(Phase::Loading, true);
        assert_eq!(route_key(key(KeyCode::Char('a')), &loading), None);
        assert_eq!(route_key(key(KeyCode::Enter), &loading), None);
    }

    #[test]
    fn test_any_key_continues_after_result() {
        for phase in [Phase::Won, Phase::Lost] {
            let over = snapshot(phase, false);
            assert_eq!(
                route_key(key(KeyCode::Char('x')), &over),
                Some(Command::ContinueDebounced)
            );
            assert_eq!(
                route_key(key(KeyCode::Enter), &over),
                Some(Command::ContinueDebounced)
            );
            assert_eq!(route_key(key(KeyCode::Enter), &snapshot(phase, true)), None);
        }
    }

    #[test]
    fn test_exit_keys() {
        let playing = snapshot(Phase::Playing, false);
        assert_eq!(route_key(key(KeyCode::Esc), &playing), Some(Command::Exit));
        let ctrl_c = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        );
        assert_eq!(route_key(ctrl_c, &playing), Some(Command::Exit));
    }

    #[test]
    fn test_keyboard_layout() {
        let keyboard = Keyboard::layout(Rect::new(0, 10, 80, 3));
        assert_eq!(keyboard.keys().len(), 26);
        let letters: LetterSet = keyboard.keys().iter().map(|&(l, _)| l).collect();
        assert_eq!(letters.len(), 26);

        // top row is 10 keys * 3 + 9 gaps = 39 wide, centred in 80
        let (q, rect) = keyboard.keys()[0];
        assert_eq!(q, Letter::new('Q'));
        assert_eq!(rect, Rect::new(20, 10, 3, 1));
        assert_eq!(keyboard.key_at(21, 10), Some(Letter::new('Q')));
        assert_eq!(keyboard.key_at(23, 10), None);
        assert_eq!(keyboard.key_at(24, 10), Some(Letter::new('W')));
        assert_eq!(keyboard.key_at(21, 12), None);
    }

    #[test]
    fn test_click_routing() {
        let keyboard = Keyboard::layout(Rect::new(0, 0, 80, 3))
            .with_continue_button(Some(Rect::new(30, 5, 20, 1)));
        let playing = snapshot(Phase::Playing, false);
        assert_eq!(
            keyboard.route_click(21, 0, &playing),
            Some(Command::Guess(Letter::new('Q')))
        );
        assert_eq!(keyboard.route_click(35, 5, &playing), None);
        assert_eq!(
            keyboard.route_click(35, 5, &snapshot(Phase::Lost, false)),
            Some(Command::Continue)
        );
        assert_eq!(keyboard.route_click(35, 5, &snapshot(Phase::Lost, true)), None);
        assert_eq!(keyboard.route_click(0, 7, &playing), None);
    }

    #[test]
    fn test_key_enabled() {
        let mut playing = snapshot(Phase::Playing, false);
        let a = Letter::new('A');
        assert!(key_enabled(a, &playing));
        playing.guessed.insert(a);
        assert!(!key_enabled(a, &playing));
        assert!(!key_enabled(Letter::new('B'), &snapshot(Phase::Loading, false)));
        assert!(!key_enabled(Letter::new('B'), &snapshot(Phase::Playing, true)));
        assert!(!key_enabled(Letter::new('B'), &snapshot(Phase::Won, false)));
    }
}
