//! Roovo terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Local backend, signed in as a guest, straight into a conversation
//! roovo --user guest-1 --start /messages/42
//!
//! # With live updates
//! roovo --api-url https://api.example.com \
//!     --realtime-url wss://project.supabase.co/realtime/v1/websocket --anon-key <key>
//! ```

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use roovo_app::{Runtime, RuntimeConfig};
use roovo_backend::{API_BASE_URL_ENV, BackendConfig, DEFAULT_API_BASE_URL};
use roovo_chat::UserId;
use roovo_tui::{Remote, SystemEnv, TerminalDriver};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Roovo terminal messaging client
#[derive(Parser, Debug)]
#[command(name = "roovo")]
#[command(about = "Guest/host messaging for Roovo in the terminal")]
#[command(version)]
struct Args {
    /// REST API base URL
    #[arg(long, env = API_BASE_URL_ENV, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Realtime websocket endpoint. Without it no live updates arrive.
    #[arg(long)]
    realtime_url: Option<String>,

    /// Public API key for the realtime service
    #[arg(long)]
    anon_key: Option<String>,

    /// User id to sign in as
    #[arg(short, long)]
    user: Option<String>,

    /// Initial path
    #[arg(short, long, default_value = "/")]
    start: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write logs to this file. Logs are discarded otherwise, since the UI
    /// owns the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let file_layer = match &args.log_file {
        Some(path) => Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(File::create(path)?))),
        None => None,
    };
    tracing_subscriber::registry().with(file_layer).with(filter).init();

    let backend = BackendConfig {
        api_base_url: args.api_url,
        realtime_url: args.realtime_url,
        anon_key: args.anon_key,
        ..Default::default()
    };
    let config = RuntimeConfig { start_path: args.start, user_id: args.user.map(UserId::new) };

    tracing::info!(api = %backend.api_base_url, start = %config.start_path, "Roovo client starting");

    let remote = Remote::connect(&backend).await?;
    let driver = TerminalDriver::new(remote)?;
    let runtime = Runtime::new(driver, SystemEnv::new(), config)?;

    Ok(runtime.run().await?)
}
