//! saavy-mixer - terminal front end for the category mixer and voice pool
//!
//! Run with: cargo run --bin saavy-mixer
//! Logs go to saavy-mixer.log; set RUST_LOG to change the filter.

mod app;
mod backend;
mod clips;
mod ui;

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use app::App;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_mixer::{io::JsonFileStore, AudioSettings};
use tracing_subscriber::EnvFilter;

const SETTINGS_PATH: &str = "audio_settings.json";
const PREFS_PATH: &str = "audio_prefs.json";
const LOG_PATH: &str = "saavy-mixer.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_tracing(Path::new(LOG_PATH))?;

    let settings = AudioSettings::load_or_default(SETTINGS_PATH);
    let store = JsonFileStore::open(PREFS_PATH).wrap_err("failed to open audio preferences")?;

    App::new(settings, store).run()
}

// The TUI owns stdout, so logs go to a file
fn init_tracing(log_path: &Path) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("saavy_mixer=info"));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .wrap_err_with(|| format!("failed to open log file {}", log_path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
