mod config;
mod report;
mod watcher;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use twickets_rs::{ClientConfig, TwicketsClient};

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Basic logging: set RUST_LOG=info (or debug) to see output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env().context("Invalid watcher configuration")?;

    let client_config = ClientConfig {
        timeout: cfg.request_timeout,
        ..ClientConfig::default()
    };
    let mut client = TwicketsClient::new_with_config(cfg.api_key.as_str(), client_config)
        .context("Failed to create Twickets client")?;
    if let Some(url) = cfg.flaresolverr_url.as_deref() {
        client = client
            .with_flaresolverr(url)
            .context("Failed to configure FlareSolverr")?;
        info!(url, "routing feed requests through FlareSolverr");
    }

    // Ctrl-C cancels the in-flight fetch and stops the poll loop
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                return;
            }
            info!("shutting down");
            cancel.cancel();
        });
    }

    watcher::run_watcher(cfg, client, cancel).await
}
