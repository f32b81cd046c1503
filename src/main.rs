mod app;
mod components;
mod config;
mod data;
mod events;
mod logging;
mod theme;
mod utils;

use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::data::client::ApiClient;
use crate::data::progress::ProgressTracker;
use crate::data::DataService;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();
    let log_path = config.log_path();
    logging::init(&log_path, &config.log_level)?;

    let progress = ProgressTracker::new();
    let client = ApiClient::new(
        &config.api_url,
        Duration::from_secs(config.request_timeout_secs),
        progress.clone(),
    )?;
    info!(api = %client.base_url(), log = %log_path.display(), "starting cc-explorer");

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let data_service = DataService::new(client, event_tx);

    let mut app = App::new(
        data_service,
        event_rx,
        progress,
        &config.api_url,
        config.items_per_page(),
        config.tick_rate_ms,
    );

    // Resolved once the event loop is running
    if let Some(query) = config.search.clone() {
        app.search(query);
    }

    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();

    result
}
