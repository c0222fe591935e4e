//! yf-crumb — Entry Point
//!
//! Small CLI that wires the production adapters together and prints a
//! freshly acquired crumb. Useful for checking the consent flow against
//! the live provider.
//!
//! Wiring sequence:
//! 1. Load config.toml (defaults when the file is absent) + validate
//! 2. Init tracing (env-filter, falls back to the configured level)
//! 3. Build the reqwest transport and in-memory cookie jar
//! 4. Build the CrumbService and acquire

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use yf_crumb::adapters::{MemoryJar, ReqwestFetch};
use yf_crumb::config::{self, AppConfig};
use yf_crumb::CrumbService;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = if Path::new(&config_path).exists() {
        config::loader::load_config(&config_path)?
    } else {
        AppConfig::default()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        quote_page = %config.provider.quote_page_url,
        "Starting crumb acquisition"
    );

    let fetch = Arc::new(
        ReqwestFetch::new(Duration::from_millis(config.http.timeout_ms))
            .context("Failed to build HTTP transport")?,
    );
    let jar = Arc::new(MemoryJar::new());

    let service = CrumbService::builder()
        .fetch(fetch)
        .cookie_jar(jar)
        .provider(config.provider)
        .build()
        .context("Failed to build crumb service")?;

    let crumb = service.acquire().await.context("Crumb acquisition failed")?;
    println!("{crumb}");

    Ok(())
}
