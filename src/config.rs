use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "cc-explorer", about = "Terminal CodeChain blockchain explorer")]
pub struct Config {
    /// Base URL of the explorer indexing API
    #[arg(
        short,
        long,
        env = "CC_EXPLORER_API_URL",
        default_value = "http://localhost:8081/api/"
    )]
    pub api_url: String,

    /// Start with a search (block number, hash or address)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Rows fetched per page for the block and asset transaction lists
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u64).range(1..=100))]
    pub items_per_page: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "CC_EXPLORER_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level filter; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cc-explorer")
                .join("cc-explorer.log")
        })
    }

    pub fn items_per_page(&self) -> usize {
        usize::try_from(self.items_per_page).unwrap_or(6)
    }
}
