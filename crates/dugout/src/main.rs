// Dugout entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the API client
// 4. Create mpsc channels
// 5. Spawn the controller task (issues the initial load)
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use dugout::api::client::StatsClient;
use dugout::api::ApiConfig;
use dugout::app;
use dugout::config;
use dugout::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Dugout starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: api={}, timeout={}s, export dir={}",
        config.api.base_url,
        config.api.timeout_secs,
        config.export_dir().display()
    );

    let api_config = ApiConfig::from_config(&config);
    let client = StatsClient::new(api_config).context("failed to build HTTP client")?;

    let (api_tx, api_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let tick = Duration::from_millis(config.ui.tick_ms);
    let state = app::AppState::new(config, Arc::new(client), api_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, api_rx, ui_tx, state).await {
            error!("Application loop error: {}", e);
        }
    });

    if let Err(e) = tui::run(ui_rx, cmd_tx, tick).await {
        error!("TUI error: {:#}", e);
    }

    // The controller exits once the command channel closes.
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    info!("Dugout shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("dugout.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dugout=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
