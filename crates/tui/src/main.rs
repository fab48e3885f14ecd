mod app;
mod client;
mod config;
mod error;
mod format;
mod local_state;
mod quick_add;
mod repository;
mod ui;

use std::{fs::OpenOptions, sync::Arc};

use tracing_subscriber::EnvFilter;

use crate::error::Result;

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging(config: &config::AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let filter = EnvFilter::try_new(format!(
        "spendbook_tui={level},engine={level}",
        level = config.log_level
    ))
    .unwrap_or_else(|_| EnvFilter::new("spendbook_tui=info,engine=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;
    tracing::info!("starting against {}", config.base_url);

    let mut app = app::App::new(config)?;
    let result = app.run().await;
    if let Err(err) = &result {
        tracing::error!("terminal client failed: {err}");
    }
    result
}
