use std::error::Error;

use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use railnexus::config::{MonitorConfig, SourceKind};
use railnexus::fetch::{Fetcher, api::ApiFetcher, page::PageFetcher};
use railnexus::monitor::Monitor;
use railnexus::notifications::NotificationService;
use railnexus::state::FileStateStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "monitor.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.contains(&"--version".to_string()) {
        println!("railnexus version: {VERSION}");
        return Ok(());
    }

    dotenv::dotenv().ok();
    init_logging();
    info!(version = VERSION, "Starting monitor run.");

    let config = match MonitorConfig::load("monitor.toml") {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Critical error loading configuration. Exiting.");
            return Err(e.into());
        }
    };
    info!(
        source = ?config.source,
        endpoint = %config.endpoint,
        line_code = %config.line_code,
        "Configuration loaded."
    );

    let fetcher: Box<dyn Fetcher> = match config.source {
        SourceKind::Api => Box::new(ApiFetcher::new(
            config.endpoint.clone(),
            config.fetch_timeout,
        )?),
        SourceKind::Page => Box::new(PageFetcher::new(
            config.endpoint.clone(),
            config.fetch_timeout,
        )?),
    };
    let notifier = NotificationService::from_credentials(
        config.bot_token.clone(),
        config.chat_id.clone(),
        config.notify_timeout,
    )?;
    let store = FileStateStore::new(&config.state_path);

    let monitor = Monitor::new(config, fetcher, notifier, store);
    monitor.run_once().await?;

    info!("Monitor run finished.");
    Ok(())
}
