//! JSON-lines traffic replayed into the origin queues.
//!
//! Each non-blank line is `{"queue": "<origin>", "correlation_id": "<optional>",
//! "body": ...}`. An object body is sent as its JSON encoding; a string body is
//! sent verbatim, which lets a fixture carry a payload that is not valid JSON.

use crate::error::AppError;
use cega_relay::{Delivery, Origin};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureLine {
    queue: String,
    #[serde(default)]
    correlation_id: Option<String>,
    body: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FixtureRecord {
    /// 1-based line number in the fixtures file.
    pub line: usize,
    pub queue: String,
    pub delivery: Delivery,
}

pub fn load(path: &Path) -> Result<Vec<FixtureRecord>, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse(&text)?;
    debug!(records = records.len(), "loaded fixtures from {}", path.display());
    Ok(records)
}

pub fn parse(text: &str) -> Result<Vec<FixtureRecord>, AppError> {
    let mut records = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if raw.trim().is_empty() {
            continue;
        }

        let fixture: FixtureLine = serde_json::from_str(raw).map_err(|err| AppError::Fixture {
            line,
            reason: err.to_string(),
        })?;
        let correlation_id = fixture
            .correlation_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let delivery = match fixture.body {
            Value::String(payload) => Delivery::new(payload.into_bytes(), correlation_id),
            body => Delivery::from_json(&body, correlation_id)?,
        };

        records.push(FixtureRecord {
            line,
            queue: fixture.queue,
            delivery,
        });
    }

    Ok(records)
}

/// Sends every record to its origin queue in file order and returns how many
/// were sent. Dropping the senders afterwards closes the queues.
pub async fn replay(
    records: Vec<FixtureRecord>,
    senders: BTreeMap<Origin, Sender<Delivery>>,
) -> usize {
    let mut sent = 0;

    for record in records {
        let origin = match Origin::parse(&record.queue) {
            Ok(origin) => origin,
            Err(err) => {
                warn!(line = record.line, err = %err, "skipping fixture");
                continue;
            }
        };
        let Some(sender) = senders.get(&origin) else {
            warn!(
                line = record.line,
                origin = %origin,
                "skipping fixture for an origin that is not consumed"
            );
            continue;
        };

        if sender.send(record.delivery).await.is_err() {
            warn!(line = record.line, "relay stopped, dropping remaining fixtures");
            break;
        }
        sent += 1;
    }

    sent
}

#[cfg(test)]
mod tests {
    use super::{parse, replay};
    use crate::error::AppError;
    use cega_relay::{channel_source, Origin, QueueSource};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[test]
    fn parses_lines_and_fills_missing_correlation_ids() {
        let text = r#"{"queue": "inbox", "correlation_id": "c-1", "body": {"user": "A"}}

{"queue": "stableIDs", "body": {"accession_ids": []}}
"#;
        let records = parse(text).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].delivery.correlation_id.as_str(), "c-1");
        assert_eq!(records[0].delivery.body, br#"{"user":"A"}"#.to_vec());
        assert_eq!(records[1].line, 3);
        let generated = records[1].delivery.correlation_id.as_str();
        assert!(Uuid::parse_str(generated).is_ok());
    }

    #[test]
    fn string_body_is_sent_verbatim() {
        let text = r#"{"queue": "verified", "body": "not json"}"#;
        let records = parse(text).unwrap();
        assert_eq!(records[0].delivery.body, b"not json".to_vec());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let text = "{\"queue\": \"inbox\", \"body\": {}}\n{\"queue\": \"inbox\"\n";
        assert!(matches!(
            parse(text),
            Err(AppError::Fixture { line: 2, .. })
        ));
    }

    #[tokio::test]
    async fn replay_skips_unknown_and_unconsumed_origins() {
        let text = r#"{"queue": "inbox", "body": {"n": 1}}
{"queue": "files.inbox", "body": {"n": 2}}
{"queue": "completed", "body": {"n": 3}}
{"queue": "inbox", "body": {"n": 4}}"#;
        let records = parse(text).unwrap();

        let (tx, mut source) = channel_source(8);
        let senders = BTreeMap::from([(Origin::Inbox, tx)]);
        assert_eq!(replay(records, senders).await, 2);

        let first = source.recv().await.unwrap().unwrap();
        let second = source.recv().await.unwrap().unwrap();
        assert_eq!(first.body, br#"{"n":1}"#.to_vec());
        assert_eq!(second.body, br#"{"n":4}"#.to_vec());
        assert!(source.recv().await.unwrap().is_none());
    }
}
