//! rss3270 gateway binary
//!
//! Run with: rss3270 --port 7300 --feeds rssfeed.url

use clap::Parser;
use rss3270::{
    DEFAULT_FEED_FILE, DEFAULT_MAX_HEADLINES, DEFAULT_PORT, FeedRegistry, Gateway, GatewayConfig,
    HttpFetcher, load_feed_urls,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve RSS headlines to TN3270 terminals")]
struct Cli {
    /// Listen on port
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Feed list file, one URL per line
    #[arg(long, short, default_value = DEFAULT_FEED_FILE)]
    feeds: String,

    /// Feed fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Maximum headlines per page
    #[arg(long, default_value_t = DEFAULT_MAX_HEADLINES)]
    max_headlines: usize,

    /// Log level when RUST_LOG is not set
    #[arg(long, short, default_value = "info")]
    log_level: String,
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig {
        bind: cli.bind,
        port: cli.port,
        feed_file: cli.feeds,
        fetch_timeout: Duration::from_secs(cli.timeout),
        max_headlines: cli.max_headlines,
        ..GatewayConfig::default()
    };
    config.validate()?;

    let feeds = load_feed_urls(&config.feed_file)?;
    info!("Loaded {} feed(s) from {}", feeds.len(), config.feed_file);
    let registry = Arc::new(FeedRegistry::new(feeds)?);
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;

    info!("Starting 3270 RSS server on {} ...", config.listen_addr());
    Gateway::bind(config, registry, fetcher).await?.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
