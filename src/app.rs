use crate::{
    audio::AudioCues,
    config::Config,
    guard::Fired,
    input::{self, Command, Keyboard},
    minigame::Minigame,
    store::HighScoreStore,
    tui::{Event, Tui},
    ui,
    words::WordBank,
};
use color_eyre::eyre::Result;
use log::info;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub struct App<S, A> {
    minigame: Minigame<S, A>,
    fired_rx: UnboundedReceiver<Fired>,
    keyboard: Keyboard,
}

enum Action {
    Draw,
    Exit,
}

impl<S: HighScoreStore, A: AudioCues> App<S, A> {
    pub fn new(config: &Config, store: S, audio: A) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            minigame: Minigame::new(WordBank::builtin(), store, audio, config.timings, fired_tx),
            fired_rx,
            keyboard: Keyboard::default(),
        }
    }

    /// runs the application's main loop until the user quits
    #[tokio::main(flavor = "current_thread")]
    pub async fn run(&mut self) -> Result<()> {
        let tui = &mut Tui::start()?;

        self.minigame.mount();
        self.draw(tui)?;

        loop {
            let action = tokio::select! {
                evt = tui.next() => match evt {
                    Some(evt) => self.handle_event(evt),
                    None => Some(Action::Exit),
                },
                Some(fired) = self.fired_rx.recv() => {
                    self.minigame.on_timer(fired);
                    Some(Action::Draw)
                }
            };
            match action {
                Some(Action::Draw) => self.draw(tui)?,
                Some(Action::Exit) => break,
                None => {}
            }
        }

        self.minigame.teardown();
        info!("exiting");
        Ok(())
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let snapshot = self.minigame.snapshot();
        let mut keyboard = Keyboard::default();
        tui.draw(|f| keyboard = ui::render(&snapshot, f.size(), f.buffer_mut()))?;
        self.keyboard = keyboard;
        Ok(())
    }

    /// updates the application's state based on user input
    fn handle_event(&mut self, evt: Event) -> Option<Action> {
        let snapshot = self.minigame.snapshot();
        let command = match evt {
            Event::Key(key_event) => input::route_key(key_event, &snapshot),
            Event::Click { column, row } => self.keyboard.route_click(column, row, &snapshot),
            Event::Resize => return Some(Action::Draw),
        }?;
        let changed = match command {
            Command::Guess(letter) => self.minigame.submit_guess(letter),
            Command::ContinueDebounced => self.minigame.request_continue(),
            Command::Continue => self.minigame.continue_game(),
            Command::Exit => return Some(Action::Exit),
        };
        changed.then_some(Action::Draw)
    }
}
