//! Writes each published envelope as one JSON line.

use crate::error::AppError;
use async_trait::async_trait;
use cega_relay::{OutboundEnvelope, QueueSink, SinkError};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct JsonLinesSink {
    writer: Mutex<BoxedWriter>,
}

impl JsonLinesSink {
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Truncates `path` if it already exists.
    pub async fn create(path: &Path) -> Result<Self, AppError> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|source| AppError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

#[async_trait]
impl QueueSink for JsonLinesSink {
    async fn publish(&self, envelope: OutboundEnvelope) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(&envelope)
            .map_err(|err| SinkError(format!("unable to encode envelope: {err}")))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|err| SinkError(format!("unable to write envelope: {err}")))?;
        writer
            .flush()
            .await
            .map_err(|err| SinkError(format!("unable to flush envelope: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonLinesSink;
    use cega_relay::{CorrelationId, OutboundEnvelope, QueueSink};
    use serde_json::{json, Value};

    fn envelope(corr: &str) -> OutboundEnvelope {
        OutboundEnvelope {
            exchange: "localega.v1".to_string(),
            routing_key: "files".to_string(),
            correlation_id: CorrelationId::new(corr),
            content_type: "application/json",
            content_encoding: "UTF-8",
            persistent: true,
            priority: 0,
            body: json!({"type": "ingest", "user": "A"})
                .as_object()
                .unwrap()
                .clone(),
        }
    }

    #[tokio::test]
    async fn writes_one_line_per_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("files.jsonl");
        let sink = JsonLinesSink::create(&path).await.unwrap();

        sink.publish(envelope("c-1")).await.unwrap();
        sink.publish(envelope("c-2")).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["correlation_id"], json!("c-1"));
        assert_eq!(lines[0]["content_type"], json!("application/json"));
        assert_eq!(lines[0]["body"]["type"], json!("ingest"));
        assert_eq!(lines[1]["correlation_id"], json!("c-2"));
    }

    #[tokio::test]
    async fn unwritable_path_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("files.jsonl");
        assert!(JsonLinesSink::create(&path).await.is_err());
    }
}
