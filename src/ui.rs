use crate::{
    game::{Phase, Snapshot, MAX_ATTEMPTS},
    input::{key_enabled, Keyboard},
    words::Letter,
};
use itertools::Itertools;
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Padding, Paragraph},
};

const PRIMARY: Color = Color::LightGreen;
const SHADOW: Color = Color::DarkGray;
const AMBER: Color = Color::Yellow;

const LETTERS_PER_ROW: usize = 15;
const PLACEHOLDER_LEN: usize = 12;

const GALLOWS: [[&str; 7]; 7] = [
    ["  +---+", "  |   |", "      |", "      |", "      |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", "      |", "      |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", "  |   |", "      |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", " /|   |", "      |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", " /|\\  |", "      |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", " /|\\  |", " /    |", "      |", "========="],
    ["  +---+", "  |   |", "  O   |", " /|\\  |", " / \\  |", "      |", "========="],
];

/// Draws the whole game and returns where the clickable parts ended up.
pub fn render(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) -> Keyboard {
    let frame = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(Style::new().fg(SHADOW))
        .padding(Padding::horizontal(1))
        .title(" HAAG-MAN ".fg(PRIMARY).bold());
    let inner = frame.inner(area);
    frame.render(area, buf);

    let [header, _, body, keys, _, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(9),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    render_header(snapshot, header, buf);

    let [gallows, right] =
        Layout::horizontal([Constraint::Length(12), Constraint::Fill(1)]).areas(body);
    render_gallows(snapshot, gallows, buf);
    let button = render_board(snapshot, right, buf);

    let keyboard = Keyboard::layout(keys).with_continue_button(button);
    render_keyboard(snapshot, &keyboard, buf);

    Paragraph::new(footer_text(snapshot.phase).fg(PRIMARY).dim())
        .alignment(Alignment::Center)
        .render(footer, buf);

    keyboard
}

fn render_header(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    Paragraph::new("TERMINAL GAME v1.0".fg(AMBER)).render(area, buf);

    let tries_style = if snapshot.remaining_attempts <= 2 && snapshot.phase == Phase::Playing {
        Style::new().fg(AMBER).add_modifier(Modifier::SLOW_BLINK)
    } else {
        Style::new().fg(PRIMARY)
    };
    Paragraph::new(Line::from(vec![
        "SCORE: ".fg(PRIMARY),
        Span::styled(snapshot.score.to_string(), Style::new().fg(AMBER)),
        "  HIGH: ".fg(PRIMARY),
        Span::styled(snapshot.high_score.to_string(), Style::new().fg(AMBER)),
        "  TRIES: ".fg(PRIMARY),
        Span::styled(snapshot.remaining_attempts.to_string(), tries_style),
    ]))
    .alignment(Alignment::Right)
    .render(area, buf);
}

fn gallows_stage(snapshot: &Snapshot) -> usize {
    if snapshot.phase == Phase::Loading {
        return 0;
    }
    usize::from(MAX_ATTEMPTS.saturating_sub(snapshot.remaining_attempts)).min(GALLOWS.len() - 1)
}

fn render_gallows(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let style = if snapshot.phase == Phase::Loading {
        Style::new().fg(PRIMARY).add_modifier(Modifier::DIM)
    } else {
        Style::new().fg(PRIMARY)
    };
    let lines = GALLOWS[gallows_stage(snapshot)].map(Line::raw);
    Paragraph::new(lines.to_vec()).style(style).render(area, buf);
}

/// The word as display rows: revealed letters, `_` for the rest.
pub fn word_rows(snapshot: &Snapshot) -> Vec<String> {
    let cells: Vec<Option<Letter>> = match (&snapshot.word, snapshot.phase) {
        (Some(word), phase) if phase != Phase::Loading => word
            .letters()
            .iter()
            .map(|&l| snapshot.guessed.contains(l).then_some(l))
            .collect(),
        (word, _) => {
            let len = word.as_ref().map_or(PLACEHOLDER_LEN, |w| w.letters().len());
            vec![None; len]
        }
    };
    cells
        .chunks(LETTERS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|cell| cell.map_or('_', char::from))
                .join(" ")
        })
        .collect()
}

/// Status, word and the result controls. Returns the continue button's area.
fn render_board(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) -> Option<Rect> {
    let rows = word_rows(snapshot);
    let [status, _, word, _, detail, button] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(rows.len() as u16 * 2),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let status_line = match snapshot.phase {
        Phase::Won => "ACCESS GRANTED - SECURITY PROTOCOL BYPASSED"
            .fg(PRIMARY)
            .slow_blink(),
        Phase::Lost => "ACCESS DENIED - SECURITY LOCKOUT INITIATED".fg(AMBER),
        Phase::Loading => "INITIALIZING WORD SEQUENCE...".fg(PRIMARY).slow_blink(),
        Phase::Playing => "".into(),
    };
    Paragraph::new(status_line)
        .alignment(Alignment::Center)
        .render(status, buf);

    let word_style = if snapshot.phase == Phase::Loading {
        Style::new().fg(SHADOW)
    } else {
        Style::new().fg(PRIMARY).add_modifier(Modifier::BOLD)
    };
    Paragraph::new(
        rows.into_iter()
            .flat_map(|row| [Line::raw(row), Line::default()])
            .collect_vec(),
    )
    .style(word_style)
    .alignment(Alignment::Center)
    .render(word, buf);

    let label = match (snapshot.phase, &snapshot.word) {
        (Phase::Won, _) => Paragraph::new("Decryption complete".fg(PRIMARY).dim()),
        (Phase::Lost, Some(w)) => Paragraph::new(Span::styled(
            format!("The word was: {w}"),
            Style::new().fg(PRIMARY).add_modifier(Modifier::DIM),
        )),
        _ => return None,
    };
    label.alignment(Alignment::Center).render(detail, buf);

    let text = format!(
        "[ {} ]",
        if snapshot.phase == Phase::Won {
            "DECRYPT NEXT SEQUENCE"
        } else {
            "RETRY ACCESS"
        }
    );
    let width = (text.len() as u16).min(button.width);
    let rect = Rect {
        x: button.x + (button.width - width) / 2,
        width,
        ..button
    };
    let style = if snapshot.transitioning {
        Style::new().fg(SHADOW)
    } else {
        Style::new().fg(Color::Black).bg(PRIMARY).add_modifier(Modifier::BOLD)
    };
    Paragraph::new(text).style(style).render(rect, buf);
    Some(rect)
}

fn key_style(letter: Letter, snapshot: &Snapshot) -> Style {
    let guessed = snapshot.guessed.contains(letter);
    let in_word = snapshot.word.as_ref().is_some_and(|w| w.contains(letter));
    if snapshot.phase == Phase::Loading {
        Style::new().fg(SHADOW)
    } else if guessed && in_word {
        Style::new().fg(Color::Black).bg(PRIMARY)
    } else if guessed {
        Style::new().fg(Color::Black).bg(AMBER)
    } else if key_enabled(letter, snapshot) {
        Style::new().fg(PRIMARY).bg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::new().fg(SHADOW)
    }
}

fn render_keyboard(snapshot: &Snapshot, keyboard: &Keyboard, buf: &mut Buffer) {
    for &(letter, rect) in keyboard.keys() {
        Paragraph::new(letter.to_string())
            .style(key_style(letter, snapshot))
            .alignment(Alignment::Center)
            .render(rect, buf);
    }
}

fn footer_text(phase: Phase) -> &'static str {
    match phase {
        Phase::Loading => "HAAG-MAN SECURITY TERMINAL // INITIALIZING...",
        Phase::Playing => "HAAG-MAN SECURITY TERMINAL // PICK A LETTER OR TYPE TO GUESS",
        Phase::Won | Phase::Lost => "HAAG-MAN SECURITY TERMINAL // PRESS ANY KEY TO CONTINUE",
    }
}
