//! ircboard - IRC dashboard appliance.
//!
//! Joins a chat channel over a line-oriented text protocol and renders
//! incoming notifications on a local character display.

mod backoff;
mod config;
mod display;
mod router;
mod supervisor;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::display::ConsolePanel;
use crate::supervisor::Supervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    config.log_settings();

    info!(
        host = %config.server.host,
        nick = %config.irc.nick,
        chan = %config.irc.chan,
        "Starting ircboard"
    );

    let panel = ConsolePanel::new(config.display.width);
    let mut supervisor = Supervisor::new(config, panel);

    // Runs forever; returns only for an unrecoverable configuration error,
    // reported once to the operator.
    supervisor.run().await?;
    Ok(())
}
