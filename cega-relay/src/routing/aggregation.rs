//! Barrier that collapses per-file `completed` events into one dataset mapping
//! per submitter.
//!
//! A batch collects messages until the configured [`ReleaseThreshold`] is
//! reached. Releasing groups the batch by submitter, emits one
//! [`DatasetMapping`] per submitter and starts a fresh batch, so a later
//! release never sees messages of an earlier one.

use crate::error::RelayError;
use crate::ids::{GeneratedId, IdGenerator, IdKind};
use crate::message::{
    CorrelationId, OutboundMessage, RawMessage, ACCESSION_IDS_FIELD, ACCESSION_ID_FIELD,
    DATASET_ID_FIELD, TYPE_FIELD, TYPE_MAPPING, USER_FIELD,
};
use crate::observability::events;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const COMPONENT: &str = "aggregation";

/// Number of buffered `completed` messages that triggers a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleaseThreshold(NonZeroUsize);

impl ReleaseThreshold {
    /// Release after every single message.
    pub const EVERY_MESSAGE: ReleaseThreshold = ReleaseThreshold(NonZeroUsize::MIN);

    /// `None` for zero, which would release an empty batch.
    pub fn new(expected_messages: usize) -> Option<Self> {
        NonZeroUsize::new(expected_messages).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for ReleaseThreshold {
    fn default() -> Self {
        Self::EVERY_MESSAGE
    }
}

#[derive(Clone, Debug, PartialEq)]
struct BatchEntry {
    submitter: String,
    accession_id: String,
}

/// Buffered `completed` messages of the current release cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregationBatch {
    entries: Vec<BatchEntry>,
    // first-seen order, used as output order on release
    submitters: Vec<String>,
}

impl AggregationBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn submitters(&self) -> impl Iterator<Item = &str> {
        self.submitters.iter().map(String::as_str)
    }

    pub fn contains_submitter(&self, submitter: &str) -> bool {
        self.submitters.iter().any(|known| known == submitter)
    }

    fn push(&mut self, entry: BatchEntry) {
        if !self.contains_submitter(&entry.submitter) {
            self.submitters.push(entry.submitter.clone());
        }
        self.entries.push(entry);
    }

    /// Accession ids per submitter, in encounter order, in one pass.
    fn group(self) -> Vec<(String, Vec<String>)> {
        let mut by_submitter: HashMap<String, Vec<String>> =
            HashMap::with_capacity(self.submitters.len());
        for entry in self.entries {
            by_submitter
                .entry(entry.submitter)
                .or_default()
                .push(entry.accession_id);
        }

        self.submitters
            .into_iter()
            .map(|submitter| {
                let ids = by_submitter.remove(&submitter).unwrap_or_default();
                (submitter, ids)
            })
            .collect()
    }
}

/// Derived `mapping` event for one submitter.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetMapping {
    pub submitter: String,
    pub dataset_id: GeneratedId,
    pub accession_ids: Vec<String>,
    pub correlation_id: CorrelationId,
}

impl DatasetMapping {
    /// Outbound form. The body is exactly `type`, `dataset_id` and `accession_ids`;
    /// the submitter is not part of it.
    pub fn into_outbound(self) -> OutboundMessage {
        let mut body = Map::new();
        body.insert(TYPE_FIELD.to_string(), Value::from(TYPE_MAPPING));
        body.insert(
            DATASET_ID_FIELD.to_string(),
            Value::from(self.dataset_id.into_string()),
        );
        body.insert(
            ACCESSION_IDS_FIELD.to_string(),
            Value::from(self.accession_ids),
        );

        OutboundMessage {
            correlation_id: self.correlation_id,
            body,
        }
    }
}

/// The single owner of barrier state when several tasks may feed it.
pub type SharedBarrier = Arc<Mutex<AggregationBarrier>>;

#[derive(Debug)]
pub struct AggregationBarrier {
    ids: IdGenerator,
    threshold: ReleaseThreshold,
    batch: AggregationBatch,
}

impl AggregationBarrier {
    pub fn new(ids: IdGenerator, threshold: ReleaseThreshold) -> Self {
        Self {
            ids,
            threshold,
            batch: AggregationBatch::default(),
        }
    }

    pub fn into_shared(self) -> SharedBarrier {
        Arc::new(Mutex::new(self))
    }

    pub fn threshold(&self) -> ReleaseThreshold {
        self.threshold
    }

    pub fn batch(&self) -> &AggregationBatch {
        &self.batch
    }

    /// Buffers a `completed` message.
    ///
    /// `user` and `accession_id` must both be strings; otherwise the batch is left
    /// untouched and [`RelayError::MissingField`] is returned.
    pub fn ingest(&mut self, msg: RawMessage) -> Result<(), RelayError> {
        let (submitter, accession_id) = match (
            msg.string_field(USER_FIELD),
            msg.string_field(ACCESSION_ID_FIELD),
        ) {
            (Ok(submitter), Ok(accession_id)) => (submitter.to_string(), accession_id.to_string()),
            (Err(err), _) | (_, Err(err)) => {
                warn!(
                    event = events::BARRIER_INGEST_REJECTED,
                    component = COMPONENT,
                    correlation_id = %msg.correlation_id,
                    err = %err,
                    "rejecting completed message"
                );
                return Err(err);
            }
        };

        debug!(
            event = events::BARRIER_INGEST,
            component = COMPONENT,
            correlation_id = %msg.correlation_id,
            submitter = submitter.as_str(),
            accession_id = accession_id.as_str(),
            buffered = self.batch.len() + 1,
            threshold = self.threshold.get(),
            "buffered completed message"
        );

        self.batch.push(BatchEntry {
            submitter,
            accession_id,
        });
        Ok(())
    }

    pub fn should_release(&self) -> bool {
        self.batch.len() >= self.threshold.get()
    }

    /// Drains the batch into one mapping per distinct submitter, each tagged with
    /// `correlation_id`. An empty batch yields nothing.
    pub fn release(&mut self, correlation_id: &CorrelationId) -> Vec<DatasetMapping> {
        let batch = std::mem::take(&mut self.batch);
        let buffered = batch.len();

        let mappings: Vec<DatasetMapping> = batch
            .group()
            .into_iter()
            .map(|(submitter, accession_ids)| DatasetMapping {
                submitter,
                dataset_id: self.ids.next_id(IdKind::Dataset),
                accession_ids,
                correlation_id: correlation_id.clone(),
            })
            .collect();

        info!(
            event = events::BARRIER_RELEASE,
            component = COMPONENT,
            correlation_id = %correlation_id,
            buffered,
            mappings = mappings.len(),
            "released completed batch"
        );

        mappings
    }

    /// Ingests `msg` and releases when the threshold is reached, using the
    /// message's own correlation id for the derived mappings.
    pub fn admit(&mut self, msg: RawMessage) -> Result<Vec<DatasetMapping>, RelayError> {
        let correlation_id = msg.correlation_id.clone();
        self.ingest(msg)?;
        if self.should_release() {
            Ok(self.release(&correlation_id))
        } else {
            Ok(Vec::new())
        }
    }
}

impl Default for AggregationBarrier {
    fn default() -> Self {
        Self::new(IdGenerator::new(), ReleaseThreshold::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregationBarrier, ReleaseThreshold};
    use crate::error::RelayError;
    use crate::ids::IdGenerator;
    use crate::message::{CorrelationId, Origin, RawMessage};
    use regex::Regex;
    use serde_json::{json, Value};

    fn completed(user: &str, accession_id: &str, correlation_id: &str) -> RawMessage {
        let Value::Object(body) = json!({
            "user": user,
            "accession_id": accession_id,
            "filepath": format!("/{user}/{accession_id}"),
        }) else {
            unreachable!()
        };
        RawMessage::new(Origin::Completed, correlation_id, body)
    }

    fn barrier(threshold: usize) -> AggregationBarrier {
        AggregationBarrier::new(
            IdGenerator::new(),
            ReleaseThreshold::new(threshold).expect("non-zero threshold"),
        )
    }

    #[test]
    fn groups_accessions_by_submitter() {
        let mut barrier = barrier(3);
        barrier.ingest(completed("A", "x1", "c1")).unwrap();
        barrier.ingest(completed("B", "y1", "c2")).unwrap();
        barrier.ingest(completed("A", "x2", "c3")).unwrap();
        assert!(barrier.should_release());

        let mappings = barrier.release(&CorrelationId::new("c3"));

        assert_eq!(mappings.len(), 2);
        let a = mappings.iter().find(|m| m.submitter == "A").unwrap();
        let b = mappings.iter().find(|m| m.submitter == "B").unwrap();
        assert_eq!(a.accession_ids, vec!["x1", "x2"]);
        assert_eq!(b.accession_ids, vec!["y1"]);
        assert!(mappings.iter().all(|m| m.correlation_id.as_str() == "c3"));
    }

    #[test]
    fn batch_keeps_submitters_in_first_seen_order() {
        let mut barrier = barrier(4);
        barrier.ingest(completed("B", "y1", "c1")).unwrap();
        barrier.ingest(completed("A", "x1", "c2")).unwrap();
        barrier.ingest(completed("B", "y2", "c3")).unwrap();

        let batch = barrier.batch();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.submitters().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(batch.contains_submitter("A"));
        assert!(!barrier.should_release());
    }

    #[test]
    fn mapping_body_has_exactly_three_fields() {
        let re = Regex::new(r"^EGAD\d{11}$").unwrap();
        let mut barrier = barrier(1);
        let mapping = barrier
            .admit(completed("A", "x1", "c1"))
            .unwrap()
            .pop()
            .unwrap();

        let out = mapping.into_outbound();
        assert_eq!(out.body.len(), 3);
        assert_eq!(out.message_type(), Some("mapping"));
        assert_eq!(out.field("accession_ids"), Some(&json!(["x1"])));
        let dataset_id = out.field("dataset_id").and_then(Value::as_str).unwrap();
        assert!(re.is_match(dataset_id));
        assert_eq!(out.correlation_id.as_str(), "c1");
    }

    #[test]
    fn empty_release_yields_nothing() {
        let mut barrier = AggregationBarrier::default();
        assert!(!barrier.should_release());
        assert!(barrier.release(&CorrelationId::new("c")).is_empty());
    }

    #[test]
    fn missing_user_is_rejected_without_side_effects() {
        let mut barrier = AggregationBarrier::default();
        let Value::Object(body) = json!({"accession_id": "x1"}) else {
            unreachable!()
        };

        let err = barrier
            .ingest(RawMessage::new(Origin::Completed, "c", body))
            .unwrap_err();

        assert!(matches!(
            err,
            RelayError::MissingField { field: "user", .. }
        ));
        assert!(barrier.batch().is_empty());
        assert_eq!(barrier.batch().submitters().count(), 0);
    }

    #[test]
    fn non_string_user_is_rejected() {
        let mut barrier = AggregationBarrier::default();
        let Value::Object(body) = json!({"user": 7, "accession_id": "x1"}) else {
            unreachable!()
        };
        assert!(barrier
            .ingest(RawMessage::new(Origin::Completed, "c", body))
            .is_err());
        assert!(!barrier.batch().contains_submitter(""));
    }

    #[test]
    fn missing_accession_id_is_rejected() {
        let mut barrier = AggregationBarrier::default();
        let Value::Object(body) = json!({"user": "A"}) else {
            unreachable!()
        };
        let err = barrier
            .ingest(RawMessage::new(Origin::Completed, "c", body))
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::MissingField {
                field: "accession_id",
                ..
            }
        ));
    }

    #[test]
    fn release_starts_a_fresh_batch() {
        let mut barrier = barrier(2);
        let pending = barrier.admit(completed("A", "x1", "c1")).unwrap();
        assert!(pending.is_empty());
        let first = barrier.admit(completed("A", "x2", "c2")).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].accession_ids, vec!["x1", "x2"]);
        assert_eq!(first[0].correlation_id.as_str(), "c2");
        assert!(barrier.batch().is_empty());

        let pending = barrier.admit(completed("B", "y1", "c3")).unwrap();
        assert!(pending.is_empty());
        let second = barrier.admit(completed("B", "y2", "c4")).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].submitter, "B");
        assert_eq!(second[0].accession_ids, vec!["y1", "y2"]);
    }

    #[test]
    fn default_threshold_releases_every_message() {
        let mut barrier = AggregationBarrier::default();
        assert_eq!(barrier.threshold().get(), 1);
        assert_eq!(barrier.admit(completed("A", "x1", "c1")).unwrap().len(), 1);
        assert_eq!(barrier.admit(completed("A", "x2", "c2")).unwrap().len(), 1);
    }

    #[test]
    fn zero_threshold_is_refused() {
        assert!(ReleaseThreshold::new(0).is_none());
    }
}
