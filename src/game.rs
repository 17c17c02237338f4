use crate::{
    audio::Cue,
    words::{Letter, LetterSet, Word},
};
use std::fmt::{self, Display};

pub const MAX_ATTEMPTS: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// Side effects a transition asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Cue(Cue),
    SaveHighScore(u32),
}

/// Why an operation left the game untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    WrongPhase(Phase),
    AlreadyGuessed(Letter),
    NoPendingWord,
}

impl Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ignored::WrongPhase(phase) => write!(f, "not allowed while {phase:?}"),
            Ignored::AlreadyGuessed(letter) => write!(f, "{letter} was already guessed"),
            Ignored::NoPendingWord => f.write_str("no word selected"),
        }
    }
}

pub type Transition = Result<Vec<Effect>, Ignored>;

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub word: Option<Word>,
    pub guessed: LetterSet,
    pub remaining_attempts: u8,
    pub phase: Phase,
    pub score: u32,
    pub high_score: u32,
    pub transitioning: bool,
}

/// One word-guessing session plus the running score.
///
/// `word` is the word on display; while loading it still holds the previous
/// word (if any) and the next one waits in `pending`.
#[derive(Debug, Clone)]
pub struct Game {
    word: Option<Word>,
    pending: Option<Word>,
    guessed: LetterSet,
    remaining_attempts: u8,
    phase: Phase,
    score: u32,
    high_score: u32,
}

impl Game {
    pub fn new(high_score: u32) -> Self {
        Self {
            word: None,
            pending: None,
            guessed: LetterSet::EMPTY,
            remaining_attempts: MAX_ATTEMPTS,
            phase: Phase::Loading,
            score: 0,
            high_score,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[cfg(test)]
    pub fn remaining_attempts(&self) -> u8 {
        self.remaining_attempts
    }

    #[cfg(test)]
    pub fn word(&self) -> Option<&Word> {
        self.word.as_ref()
    }

    /// Enters `Loading` with `word` queued, whatever the current phase.
    /// Used on mount and for forced resets.
    pub fn load(&mut self, word: Word) {
        self.phase = Phase::Loading;
        self.pending = Some(word);
    }

    /// `Won`/`Lost` -> `Loading` with the next word queued.
    pub fn continue_with(&mut self, word: Word) -> Transition {
        if !self.phase.is_over() {
            return Err(Ignored::WrongPhase(self.phase));
        }
        self.load(word);
        Ok(vec![Effect::Cue(Cue::Click)])
    }

    /// `Loading` -> `Playing`: the queued word becomes visible with a clean slate.
    pub fn reveal(&mut self) -> Transition {
        if self.phase != Phase::Loading {
            return Err(Ignored::WrongPhase(self.phase));
        }
        let word = self.pending.take().ok_or(Ignored::NoPendingWord)?;
        self.word = Some(word);
        self.guessed = LetterSet::EMPTY;
        self.remaining_attempts = MAX_ATTEMPTS;
        self.phase = Phase::Playing;
        Ok(vec![])
    }

    /// Applies one letter guess, then settles win/lose.
    pub fn guess(&mut self, letter: Letter) -> Transition {
        if self.phase != Phase::Playing {
            return Err(Ignored::WrongPhase(self.phase));
        }
        let Some(word) = &self.word else {
            return Err(Ignored::NoPendingWord);
        };
        if !self.guessed.insert(letter) {
            return Err(Ignored::AlreadyGuessed(letter));
        }
        let mut effects = if word.contains(letter) {
            vec![Effect::Cue(Cue::Correct)]
        } else {
            self.remaining_attempts = self.remaining_attempts.saturating_sub(1);
            vec![Effect::Cue(Cue::Wrong)]
        };
        effects.extend(self.settle());
        Ok(effects)
    }

    /// Checks for a win or loss. Only acts while `Playing`, so calling it
    /// again after a result is a no-op.
    pub fn settle(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Playing {
            return vec![];
        }
        let Some(word) = &self.word else {
            return vec![];
        };
        if word.is_revealed_by(self.guessed) {
            self.phase = Phase::Won;
            self.score += 1;
            let mut effects = vec![Effect::Cue(Cue::Win)];
            if self.score > self.high_score {
                self.high_score = self.score;
                effects.push(Effect::SaveHighScore(self.score));
            }
            effects
        } else if self.remaining_attempts == 0 {
            self.phase = Phase::Lost;
            self.score = 0;
            vec![Effect::Cue(Cue::Lose)]
        } else {
            vec![]
        }
    }

    pub fn snapshot(&self, transitioning: bool) -> Snapshot {
        Snapshot {
            word: self.word.clone(),
            guessed: self.guessed,
            remaining_attempts: self.remaining_attempts,
            phase: self.phase,
            score: self.score,
            high_score: self.high_score,
            transitioning,
        }
    }
}
