//! Event dispatcher - the log subscription and per-event task fan-out.
//!
//! Each notification spawns an independent task, so a hanging or failing
//! event chain never blocks the subscription from delivering the next one.
//! All downstream failures are caught here and routed to the error sink.

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::error_sink::ErrorSink;
use crate::pipeline::parser::{LaunchParser, TransactionSource};
use crate::pipeline::risk::{ReportSource, RiskAssessor};
use crate::pipeline::store::EventStore;
use anyhow::{Context, Result};
use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::transaction::TransactionError;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The assembled event-to-record pipeline.
pub struct LaunchPipeline {
    config: PipelineConfig,
    parser: LaunchParser,
    assessor: RiskAssessor,
    store: EventStore,
    errors: ErrorSink,
}

impl LaunchPipeline {
    pub fn new(
        config: PipelineConfig,
        transactions: Arc<dyn TransactionSource>,
        reports: Arc<dyn ReportSource>,
    ) -> Self {
        let parser = LaunchParser::new(
            transactions,
            config.pool_authority.clone(),
            config.reference_mint.clone(),
        );
        let assessor = RiskAssessor::new(reports, config.risk_check_interval);
        let store = EventStore::new(config.record_path.clone());
        let errors = ErrorSink::new(config.error_log_path.clone());
        Self {
            config,
            parser,
            assessor,
            store,
            errors,
        }
    }

    /// Subscribe to pool-creation logs and dispatch notifications until the
    /// stream ends.
    ///
    /// Registration failure surfaces as the returned error; reconnecting is
    /// left to process supervision.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let pubsub = PubsubClient::new(&self.config.ws_endpoint)
            .await
            .with_context(|| format!("websocket connection to {} failed", self.config.ws_endpoint))?;

        let (mut notifications, _unsubscribe) = pubsub
            .logs_subscribe(
                RpcTransactionLogsFilter::Mentions(vec![self.config.filter_key.clone()]),
                RpcTransactionLogsConfig {
                    commitment: Some(CommitmentConfig::confirmed()),
                },
            )
            .await
            .context("log subscription registration failed")?;

        info!("monitoring new token launches (filter: {})", self.config.filter_key);

        while let Some(notification) = notifications.next().await {
            let value = notification.value;
            let pipeline = Arc::clone(&self);
            tokio::spawn(async move {
                pipeline
                    .handle_notification(value.logs, value.err, value.signature)
                    .await;
            });
        }

        warn!("log subscription stream ended");
        Ok(())
    }

    /// Entry point for a single notification.
    ///
    /// Failed transactions are discarded; any error from the downstream
    /// chain goes to the error sink and stops only this event.
    pub async fn handle_notification(
        &self,
        logs: Vec<String>,
        err: Option<TransactionError>,
        signature: String,
    ) {
        if let Some(err) = err {
            warn!(%signature, "transaction failed on-chain, skipping: {err}");
            return;
        }

        info!(%signature, "found new token launch signature");
        if let Err(e) = self.process_event(logs, &signature).await {
            self.errors
                .record(&format!("processing launch event {signature}"), &e)
                .await;
        }
    }

    async fn process_event(&self, logs: Vec<String>, signature: &str) -> Result<()> {
        let mut event = self.parser.parse(signature, logs).await?;
        self.store.upsert(&event).await?;

        let mint = event.base_info.address.clone();
        if mint.is_empty() {
            debug!(%signature, "no base mint parsed, leaving record unassessed");
            return Ok(());
        }

        match self.assessor.assess(&mint).await {
            Some(report) => {
                event.risk_assessment = Some(report);
                self.store.upsert(&event).await?;
                info!(%signature, %mint, "stored risk assessment");
            }
            None => info!(%signature, %mint, "no risk report available"),
        }
        Ok(())
    }
}
