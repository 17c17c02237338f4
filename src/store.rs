use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use std::{fs, io::ErrorKind, path::PathBuf};

/// Durable storage for the best score.
pub trait HighScoreStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<u32>>;

    fn save(&mut self, score: u32) -> Result<()>;
}

/// Keeps the high score as a decimal integer in a text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for FileStore {
    fn load(&mut self) -> Result<Option<u32>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("reading {}", self.path.display()))
            }
        };
        let text = text.trim();
        text.parse()
            .map(Some)
            .map_err(|e| eyre!("corrupt high score {text:?} in {}: {e}", self.path.display()))
    }

    fn save(&mut self, score: u32) -> Result<()> {
        fs::write(&self.path, format!("{score}\n"))
            .wrap_err_with(|| format!("writing {}", self.path.display()))
    }
}

#[cfg(test)]
pub mod testing {
    use super::HighScoreStore;
    use color_eyre::{eyre::eyre, Result};

    /// In-process store; optionally fails on purpose.
    #[derive(Debug, Default, Clone)]
    pub struct MemoryStore {
        pub value: Option<u32>,
        pub writes: Vec<u32>,
        pub fail_load: bool,
        pub fail_save: bool,
    }

    impl MemoryStore {
        pub fn with_value(value: u32) -> Self {
            Self {
                value: Some(value),
                ..Default::default()
            }
        }
    }

    impl HighScoreStore for MemoryStore {
        fn load(&mut self) -> Result<Option<u32>> {
            if self.fail_load {
                return Err(eyre!("storage unavailable"));
            }
            Ok(self.value)
        }

        fn save(&mut self, score: u32) -> Result<()> {
            if self.fail_save {
                return Err(eyre!("storage unavailable"));
            }
            self.value = Some(score);
            self.writes.push(score);
            Ok(())
        }
    }
}
