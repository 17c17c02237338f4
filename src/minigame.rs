use crate::{
    audio::{AudioCues, Cue},
    config::Timings,
    game::{Effect, Game, Ignored, Phase, Snapshot},
    guard::{Fired, TimerKind, TransitionGuard},
    store::HighScoreStore,
    words::{Letter, Word, WordBank},
};
use log::{debug, info, trace, warn};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// The hangman core: owns the game, drives it through the guard's timers and
/// performs the effects it asks for against the storage and audio adapters.
///
/// All methods must run on the same task that receives the guard's
/// [`Fired`] events; firings are handed back through [`Minigame::on_timer`].
pub struct Minigame<S, A> {
    game: Game,
    guard: TransitionGuard,
    bank: WordBank,
    rng: StdRng,
    store: S,
    audio: A,
    timings: Timings,
    mounted: bool,
}

impl<S: HighScoreStore, A: AudioCues> Minigame<S, A> {
    pub fn new(
        bank: WordBank,
        store: S,
        audio: A,
        timings: Timings,
        fired_tx: UnboundedSender<Fired>,
    ) -> Self {
        Self {
            game: Game::new(0),
            guard: TransitionGuard::new(fired_tx),
            bank,
            rng: StdRng::from_entropy(),
            store,
            audio,
            timings,
            mounted: false,
        }
    }

    #[cfg(test)]
    fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        self.game.snapshot(self.guard.is_transitioning())
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.game.phase()
    }

    /// Reads the high score and starts the first session after the boot delay.
    pub fn mount(&mut self) {
        if self.mounted || !self.guard.is_alive() {
            return;
        }
        self.mounted = true;
        let high_score = match self.store.load() {
            Ok(score) => score.unwrap_or_default(),
            Err(e) => {
                warn!("high score unavailable, starting from 0: {e:#}");
                0
            }
        };
        self.game = Game::new(high_score);
        self.audio.play(Cue::Boot);
        info!("mounted with high score {high_score}");
        self.start_session(self.timings.boot);
    }

    /// The single entry point for letter guesses from any input device.
    /// Returns true if the guess was applied.
    pub fn submit_guess(&mut self, letter: Letter) -> bool {
        if self.guard.is_transitioning() {
            trace!("guess {letter} ignored: transition in flight");
            return false;
        }
        match self.game.guess(letter) {
            Ok(effects) => {
                self.perform(effects);
                if self.game.phase().is_over() {
                    info!(
                        "session over: {:?}, score {}, high score {}",
                        self.game.phase(),
                        self.game.score(),
                        self.game.high_score()
                    );
                }
                true
            }
            Err(ignored) => {
                trace!("guess {letter} ignored: {ignored}");
                false
            }
        }
    }

    /// Continue after a win or retry after a loss. Returns true if a new
    /// session is on its way.
    pub fn continue_game(&mut self) -> bool {
        if !self.game.phase().is_over() {
            return false;
        }
        if !self.guard.try_begin() {
            trace!("continue ignored: transition in flight");
            return false;
        }
        self.guard.cancel(TimerKind::Debounce);
        let word = match self.bank.choose(&mut self.rng) {
            Ok(word) => word,
            Err(e) => {
                warn!("word selection failed, resetting: {e:#}");
                self.guard.finish();
                self.reset(WordBank::fallback(), self.timings.restart);
                return true;
            }
        };
        match self.game.continue_with(word) {
            Ok(effects) => {
                self.perform(effects);
                self.arm_loading(self.timings.continue_after);
                true
            }
            Err(ignored) => {
                self.guard.finish();
                trace!("continue ignored: {ignored}");
                false
            }
        }
    }

    /// Keyboard path to [`Minigame::continue_game`]: waits out the debounce so
    /// key repeat collapses into one action.
    pub fn request_continue(&mut self) -> bool {
        if !self.game.phase().is_over() || self.guard.is_transitioning() {
            return false;
        }
        self.guard.arm(TimerKind::Debounce, self.timings.debounce);
        true
    }

    pub fn on_timer(&mut self, fired: Fired) {
        if !self.guard.accept(fired) {
            return;
        }
        match fired.kind {
            TimerKind::Forward => self.finish_loading(),
            TimerKind::Watchdog => self.recover(),
            TimerKind::Debounce => {
                self.continue_game();
            }
        }
    }

    /// Cancels all timers; the minigame ignores everything afterwards.
    pub fn teardown(&mut self) {
        debug!("teardown");
        self.guard.teardown();
    }

    fn start_session(&mut self, delay: Duration) {
        let word = self.bank.choose(&mut self.rng).unwrap_or_else(|e| {
            warn!("word selection failed, using fallback: {e:#}");
            WordBank::fallback()
        });
        self.reset(word, delay);
    }

    /// Fresh `Loading` with `word` queued, regardless of the current phase.
    fn reset(&mut self, word: Word, delay: Duration) {
        if !self.guard.try_begin() {
            // a transition is already in flight: it will be superseded below
            trace!("reset supersedes in-flight transition");
        }
        self.game.load(word);
        self.arm_loading(delay);
    }

    fn arm_loading(&mut self, delay: Duration) {
        debug!("loading next word for {delay:?}");
        self.guard.arm(TimerKind::Forward, delay);
        self.guard.arm(TimerKind::Watchdog, self.timings.watchdog);
    }

    fn finish_loading(&mut self) {
        self.guard.cancel(TimerKind::Watchdog);
        match self.game.reveal() {
            Ok(effects) => {
                self.perform(effects);
                self.guard.finish();
                debug!("playing");
            }
            Err(Ignored::NoPendingWord) => {
                warn!("no word queued when loading finished, resetting");
                self.guard.finish();
                self.reset(WordBank::fallback(), self.timings.restart);
            }
            Err(ignored) => {
                trace!("reveal ignored: {ignored}");
                self.guard.finish();
            }
        }
    }

    /// Watchdog path: still stuck in `Loading`, so start over and reveal at once.
    fn recover(&mut self) {
        if self.game.phase() != Phase::Loading {
            self.guard.finish();
            return;
        }
        warn!("loading stalled for {:?}, forcing a fresh session", self.timings.watchdog);
        self.guard.cancel(TimerKind::Forward);
        self.guard.finish();
        let word = self
            .bank
            .choose(&mut self.rng)
            .unwrap_or_else(|_| WordBank::fallback());
        self.game.load(word);
        if let Ok(effects) = self.game.reveal() {
            self.perform(effects);
        }
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Cue(cue) => self.audio.play(cue),
                Effect::SaveHighScore(score) => {
                    if let Err(e) = self.store.save(score) {
                        warn!("could not save high score {score}: {e:#}");
                    }
                }
            }
        }
    }
}
