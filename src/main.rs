//! Main entry point for the rugwatch launch monitor.

use anyhow::{Context, Result};
use reqwest::Client;
use rugwatch::pipeline::{HttpReportSource, LaunchPipeline, PipelineConfig, RpcTransactionSource};
use solana_client::nonblocking::rpc_client::RpcClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = PipelineConfig::from_env();
    info!("starting rugwatch launch monitor");
    info!("rpc endpoint: {}", config.rpc_endpoint);
    info!("record file: {}", config.record_path.display());

    let rpc = Arc::new(RpcClient::new(config.rpc_endpoint.clone()));
    let http = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let transactions = Arc::new(RpcTransactionSource::new(rpc));
    let reports = Arc::new(HttpReportSource::new(http, config.risk_api_base.clone()));

    let pipeline = Arc::new(LaunchPipeline::new(config, transactions, reports));
    pipeline.run().await
}
