//! blockstream - chain block streamer
//!
//! Follows a chain through a JSON-RPC access node and logs every block's
//! transactions as they are published.

use anyhow::{Context, Result};
use blockstream::config::{load_config, StreamConfig};
use blockstream::rpc::RpcClient;
use blockstream::{shutdown, BlockResult, DiagnosticContext, StandardDecoder, Streamer, TracingSink};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Chain block streamer
#[derive(Parser)]
#[command(name = "blockstream")]
#[command(about = "Stream blocks and their transactions from a chain access node")]
struct Args {
    /// RPC endpoint URL
    #[arg(short, long, default_value = "http://127.0.0.1:8888")]
    rpc_url: String,

    /// Path to a config file (`key = value` per line, optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Height already seen; streaming starts right after it (0 = current tip)
    #[arg(short, long)]
    start_height: Option<u64>,

    /// Baseline wait between polls, in milliseconds
    #[arg(short, long)]
    poll_interval_ms: Option<u64>,
}

impl Args {
    fn stream_config(&self) -> Result<StreamConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?,
            None => StreamConfig::default(),
        };
        if let Some(height) = self.start_height {
            config.start_height = height;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }
}

fn log_result(result: &BlockResult) {
    let latency_ms = result.started_at.elapsed().as_millis() as u64;
    if let Some(e) = &result.error {
        error!(
            height = result.block.height,
            context = %result.context,
            "Block failed: {}",
            e
        );
        return;
    }

    info!(
        height = result.block.height,
        id = %result.block.id,
        transactions = result.transactions.len(),
        latency_ms,
        "Block received"
    );
    for tx in &result.transactions {
        info!(
            "  tx {} proposer={} status={:?} events={}",
            tx.id,
            tx.proposer,
            tx.status,
            tx.events.len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.stream_config()?;

    info!("Starting blockstream");
    info!("RPC URL: {}", args.rpc_url);
    info!("Poll interval: {:?}", config.poll_interval);

    let rpc = RpcClient::new(args.rpc_url.clone());
    let context = DiagnosticContext::new().with("rpc", &args.rpc_url);
    let (tx, mut rx) = mpsc::channel(config.channel_capacity);
    let (handle, signal) = shutdown::channel();

    let streamer = Streamer::new(rpc, StandardDecoder, config, Arc::new(TracingSink), context);
    let engine = tokio::spawn(streamer.run(signal, tx));

    // Handle Ctrl+C gracefully
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(result) => log_result(&result),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down gracefully...");
                handle.trigger();
                break;
            }
        }
    }

    engine
        .await
        .context("Streamer task panicked")?
        .context("Streamer error")?;

    info!("Shutdown complete");
    Ok(())
}
