//! Record store - durable JSON document of launch events.
//!
//! The whole document is loaded, merged, and rewritten per upsert, with a
//! global async lock serializing concurrent event chains so an interleaved
//! upsert never drops another signature's record.

use crate::types::TokenLaunchEvent;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Append/update persistence for [`TokenLaunchEvent`] records, keyed by
/// transaction signature.
pub struct EventStore {
    path: PathBuf,
    /// Serializes load-merge-save; the file is a single whole document
    write_lock: Mutex<()>,
}

impl EventStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Insert or update the record for `event.signature`. Idempotent.
    ///
    /// The first write for a signature appends the full event. A later write
    /// for the same signature updates only the risk assessment, and only
    /// when the incoming event carries one; every originally captured field
    /// stays as written.
    pub async fn upsert(&self, event: &TokenLaunchEvent) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        match records.iter_mut().find(|r| r.signature == event.signature) {
            Some(existing) => {
                if event.risk_assessment.is_some() {
                    existing.risk_assessment = event.risk_assessment.clone();
                    debug!(signature = %event.signature, "updated risk assessment on stored record");
                }
            }
            None => {
                records.push(event.clone());
                debug!(signature = %event.signature, "appended new launch record");
            }
        }

        self.save(&records).await
    }

    /// Read the full persisted document.
    pub async fn records(&self) -> Result<Vec<TokenLaunchEvent>> {
        let _guard = self.write_lock.lock().await;
        self.load().await
    }

    async fn load(&self) -> Result<Vec<TokenLaunchEvent>> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("record file {} is not valid JSON", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to read record file {}", self.path.display()))),
        }
    }

    async fn save(&self, records: &[TokenLaunchEvent]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("failed to create data directory {}", dir.display()))?;
            }
        }
        let json = serde_json::to_vec_pretty(records).context("failed to serialize records")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write record file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn temp_store(name: &str) -> EventStore {
        let path = std::env::temp_dir()
            .join("rugwatch-store-tests")
            .join(format!("{name}-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        EventStore::new(path)
    }

    fn event(signature: &str) -> TokenLaunchEvent {
        TokenLaunchEvent::new(signature, vec!["Program log: initialize2".to_string()])
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_signature() {
        let store = temp_store("idempotent");
        let launch = event("SIG1");

        store.upsert(&launch).await.unwrap();
        store.upsert(&launch).await.unwrap();

        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].signature, "SIG1");
    }

    #[tokio::test]
    async fn second_write_updates_only_the_risk_assessment() {
        let store = temp_store("risk-update");
        let mut launch = event("SIG1");
        launch.creator = "CreatorWallet".to_string();
        store.upsert(&launch).await.unwrap();

        let original_timestamp = store.records().await.unwrap()[0].timestamp;

        let mut enriched = launch.clone();
        enriched.creator = "SomeoneElse".to_string();
        enriched.risk_assessment = Some(serde_json::json!({"score": 42}));
        store.upsert(&enriched).await.unwrap();

        let records = store.records().await.unwrap();
        assert_eq!(records.len(), 1);
        // Originally captured fields survive the enrichment write untouched.
        assert_eq!(records[0].creator, "CreatorWallet");
        assert_eq!(records[0].timestamp, original_timestamp);
        assert_eq!(
            records[0].risk_assessment,
            Some(serde_json::json!({"score": 42}))
        );
    }

    #[tokio::test]
    async fn write_without_assessment_never_clears_a_stored_one() {
        let store = temp_store("monotonic");
        let mut launch = event("SIG1");
        launch.risk_assessment = Some(serde_json::json!({"score": 7}));
        store.upsert(&launch).await.unwrap();

        launch.risk_assessment = None;
        store.upsert(&launch).await.unwrap();

        let records = store.records().await.unwrap();
        assert_eq!(records[0].risk_assessment, Some(serde_json::json!({"score": 7})));
    }

    #[tokio::test]
    async fn concurrent_upserts_for_different_signatures_keep_all_records() {
        let store = Arc::new(temp_store("concurrent"));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.upsert(&event(&format!("SIG{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut signatures: Vec<String> = store
            .records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.signature)
            .collect();
        signatures.sort();
        assert_eq!(signatures.len(), 8);
        assert_eq!(signatures[0], "SIG0");
        assert_eq!(signatures[7], "SIG7");
    }
}
