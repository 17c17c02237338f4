use crate::tui;
use color_eyre::{config::HookBuilder, eyre::Result};
use std::panic;

/// Installs color-eyre's panic and error hooks, restoring the terminal before
/// either one prints.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .display_env_section(false)
        .into_hooks();

    let panic_hook = panic_hook.into_panic_hook();
    panic::set_hook(Box::new(move |panic_info| {
        tui::restore();
        panic_hook(panic_info);
    }));

    let eyre_hook = eyre_hook.into_eyre_hook();
    color_eyre::eyre::set_hook(Box::new(move |error| {
        tui::restore();
        eyre_hook(error)
    }))?;

    Ok(())
}
