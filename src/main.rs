use audio::{AudioCues, Bell, Mute};
use color_eyre::eyre::{Result, WrapErr};
use config::Config;
use log::info;
use std::fs::File;
use store::FileStore;

mod app;
mod audio;
mod config;
mod errors;
mod game;
mod guard;
mod input;
mod minigame;
mod store;
mod tui;
mod ui;
mod words;

fn main() -> Result<()> {
    errors::install_hooks()?;
    let config = Config::from_env();
    init_logging(&config)?;
    info!("high score file: {}", config.score_file.display());

    let audio: Box<dyn AudioCues> = if config.muted {
        Box::new(Mute)
    } else {
        Box::new(Bell)
    };
    app::App::new(&config, FileStore::new(&config.score_file), audio).run()
}

/// The terminal belongs to the game, so logs only go to a file, and only when asked.
fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}
