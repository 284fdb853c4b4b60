//! Error sink - durable, best-effort capture of pipeline failures.

use anyhow::Error;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

/// Appends one timestamped line per incident to an error log file.
///
/// Never raises: a failure to write the log itself is reported on the
/// console channel and otherwise swallowed, so error capture can never
/// interrupt the pipeline.
pub struct ErrorSink {
    path: PathBuf,
}

impl ErrorSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn record(&self, context: &str, err: &Error) {
        error!("{context}: {err:#}");

        let line = format!("[{}] {context}: {err:#}\n", Utc::now().to_rfc3339());
        if let Err(write_err) = self.append(&line).await {
            warn!("failed to append to error log {}: {write_err}", self.path.display());
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_one_line_per_incident() {
        let path = std::env::temp_dir()
            .join("rugwatch-sink-tests")
            .join(format!("errors-{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let sink = ErrorSink::new(path.clone());
        sink.record("parsing SIG1", &anyhow::anyhow!("fetch timed out")).await;
        sink.record("parsing SIG2", &anyhow::anyhow!("connection refused")).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("parsing SIG1"));
        assert!(lines[0].contains("fetch timed out"));
        assert!(lines[1].contains("parsing SIG2"));
    }
}
