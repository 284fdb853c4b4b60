//! Risk assessor - throttled client for the token reputation service.
//!
//! One assessment is permitted per throttle window, process-wide. A rejected
//! or failed assessment is never retried for the same event; the caller
//! treats `None` uniformly as "no report available now".

use crate::types::RiskReport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Source of risk reports.
///
/// `Ok(None)` is an upstream refusal (non-2xx); `Err` is a transport
/// failure. The distinction only affects diagnostics.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_report(&self, mint: &str) -> Result<Option<RiskReport>>;
}

/// Production [`ReportSource`] backed by the RugCheck HTTP API.
pub struct HttpReportSource {
    http: Client,
    base_url: String,
}

impl HttpReportSource {
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch_report(&self, mint: &str) -> Result<Option<RiskReport>> {
        let url = format!("{}/tokens/{}/report/summary", self.base_url, mint);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("risk report request failed for {mint}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%mint, %status, "risk service rejected the request: {body}");
            return Ok(None);
        }

        let report = response
            .json()
            .await
            .with_context(|| format!("risk report body was not valid JSON for {mint}"))?;
        Ok(Some(report))
    }
}

/// Rate-limited wrapper around a [`ReportSource`].
pub struct RiskAssessor {
    source: Arc<dyn ReportSource>,
    /// Time of the last invocation that passed the gate; shared process-wide
    last_attempt: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RiskAssessor {
    pub fn new(source: Arc<dyn ReportSource>, min_interval: Duration) -> Self {
        Self {
            source,
            last_attempt: Mutex::new(None),
            min_interval,
        }
    }

    /// Fetch the risk report for `mint`, subject to the process-wide throttle.
    ///
    /// Returns `None` on throttle rejection, upstream refusal, or transport
    /// error; each branch logs its own diagnostic and nothing escapes this
    /// boundary.
    pub async fn assess(&self, mint: &str) -> Option<RiskReport> {
        if !self.try_pass_gate().await {
            info!(%mint, "skipping risk check: throttled");
            return None;
        }

        info!(%mint, "checking risk report");
        match self.source.fetch_report(mint).await {
            Ok(Some(report)) => Some(report),
            Ok(None) => None,
            Err(e) => {
                error!(%mint, "risk report fetch failed: {e:#}");
                None
            }
        }
    }

    /// Atomic check-and-set on the throttle clock.
    ///
    /// The clock moves only when an attempt passes, and it moves before the
    /// network call starts, so concurrent assessments cannot both pass the
    /// gate for overlapping instants. Rejections leave the clock untouched.
    async fn try_pass_gate(&self) -> bool {
        let mut last = self.last_attempt.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.min_interval {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        report: Option<RiskReport>,
    }

    impl CountingSource {
        fn new(report: Option<RiskReport>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                report,
            }
        }
    }

    #[async_trait]
    impl ReportSource for CountingSource {
        async fn fetch_report(&self, _mint: &str) -> Result<Option<RiskReport>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.report.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ReportSource for FailingSource {
        async fn fetch_report(&self, mint: &str) -> Result<Option<RiskReport>> {
            Err(anyhow::anyhow!("connection refused while checking {mint}"))
        }
    }

    #[tokio::test]
    async fn throttle_rejects_inside_window_and_passes_after() {
        let source = Arc::new(CountingSource::new(Some(serde_json::json!({"score": 1}))));
        let assessor = RiskAssessor::new(source.clone(), Duration::from_millis(200));

        // t=0: passes and performs the network call
        assert!(assessor.assess("MintA").await.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // inside the window: rejected with no network call
        assert!(assessor.assess("MintB").await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        // after the window: passes again
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(assessor.assess("MintC").await.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejection_does_not_move_the_clock() {
        let source = Arc::new(CountingSource::new(Some(serde_json::json!({"score": 1}))));
        let assessor = RiskAssessor::new(source.clone(), Duration::from_millis(200));

        assert!(assessor.assess("MintA").await.is_some());
        // Repeated rejected attempts must not push the next permitted call
        // further into the future.
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(60)).await;
            assert!(assessor.assess("MintB").await.is_none());
        }
        tokio::time::sleep(Duration::from_millis(60)).await;
        // ~240ms since the only passing attempt, so the gate is open again.
        assert!(assessor.assess("MintC").await.is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transport_error_yields_none() {
        let assessor = RiskAssessor::new(Arc::new(FailingSource), Duration::from_millis(10));
        assert!(assessor.assess("MintA").await.is_none());
    }

    #[tokio::test]
    async fn upstream_refusal_yields_none_but_consumes_the_window() {
        let source = Arc::new(CountingSource::new(None));
        let assessor = RiskAssessor::new(source.clone(), Duration::from_millis(200));

        assert!(assessor.assess("MintA").await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        // The failed attempt still counted against the throttle.
        assert!(assessor.assess("MintB").await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
