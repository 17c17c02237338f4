use std::io::Write;

/// Named sound effects the game asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Click,
    Correct,
    Wrong,
    Win,
    Lose,
    Boot,
}

/// Fire-and-forget playback. Implementations must not fail loudly.
pub trait AudioCues {
    fn play(&mut self, cue: Cue);
}

/// Rings the terminal bell for the cues worth hearing in a terminal.
#[derive(Debug, Default)]
pub struct Bell;

impl AudioCues for Bell {
    fn play(&mut self, cue: Cue) {
        if matches!(cue, Cue::Wrong | Cue::Win | Cue::Lose) {
            let mut stderr = std::io::stderr();
            let _unused = stderr.write_all(b"\x07").and_then(|()| stderr.flush());
        }
    }
}

#[derive(Debug, Default)]
pub struct Mute;

impl AudioCues for Mute {
    fn play(&mut self, _cue: Cue) {}
}

impl<A: AudioCues + ?Sized> AudioCues for Box<A> {
    fn play(&mut self, cue: Cue) {
        (**self).play(cue)
    }
}

#[cfg(test)]
pub mod testing {
    use super::{AudioCues, Cue};
    use std::{cell::RefCell, rc::Rc};

    /// Records every cue; clones share the same log.
    #[derive(Debug, Default, Clone)]
    pub struct Recorder(Rc<RefCell<Vec<Cue>>>);

    impl Recorder {
        pub fn cues(&self) -> Vec<Cue> {
            self.0.borrow().clone()
        }

        pub fn count(&self, cue: Cue) -> usize {
            self.0.borrow().iter().filter(|&&c| c == cue).count()
        }
    }

    impl AudioCues for Recorder {
        fn play(&mut self, cue: Cue) {
            self.0.borrow_mut().push(cue);
        }
    }
}
