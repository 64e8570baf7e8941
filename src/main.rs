use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alfil_uci::{EngineConfig, UciEngine};

fn main() -> Result<()> {
    // stdout carries the UCI protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "alfil starting");
    UciEngine::new(EngineConfig::default())?.run()?;
    Ok(())
}
