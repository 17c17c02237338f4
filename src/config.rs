use std::{env, ffi::OsString, path::PathBuf, time::Duration};

const SCORE_FILE_NAME: &str = ".haagman_high_score";

/// Delays used by the transition guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Dwell in `Loading` on first mount.
    pub boot: Duration,
    /// Dwell after a fresh reset.
    pub restart: Duration,
    /// Dwell after continue/retry.
    pub continue_after: Duration,
    /// How long `Loading` may last before recovery kicks in.
    pub watchdog: Duration,
    /// Keypress debounce before continue/retry.
    pub debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            boot: Duration::from_millis(1000),
            restart: Duration::from_millis(400),
            continue_after: Duration::from_millis(500),
            watchdog: Duration::from_millis(3000),
            debounce: Duration::from_millis(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub score_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub muted: bool,
    pub timings: Timings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var_os(key))
    }

    fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> Self {
        let score_file = var("HAAGMAN_SCORE_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                var("HOME")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_default()
                    .join(SCORE_FILE_NAME)
            });
        let log_file = var("HAAGMAN_LOG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let muted = var("HAAGMAN_MUTE").is_some_and(|v| !v.is_empty() && v != "0");
        Self {
            score_file,
            log_file,
            muted,
            timings: Timings::default(),
        }
    }
}
