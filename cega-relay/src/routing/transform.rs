//! Per-origin rewrite rules for messages relayed one-to-one.

use crate::ids::{IdGenerator, IdKind};
use crate::message::{
    JsonObject, Origin, OutboundMessage, RawMessage, ACCESSION_ID_FIELD, DATASET_ID_FIELD,
    FILESIZE_FIELD, OPERATION_FIELD, TYPE_ACCESSION, TYPE_FIELD, TYPE_INGEST, TYPE_MAPPING,
};
use crate::observability::{events, fields};
use serde_json::Value;
use tracing::debug;

const COMPONENT: &str = "transform";

#[derive(Clone, Copy, Debug, Default)]
pub struct MessageTransformer {
    ids: IdGenerator,
}

impl MessageTransformer {
    pub fn new(ids: IdGenerator) -> Self {
        Self { ids }
    }

    /// Rewrites `msg` according to its origin.
    ///
    /// Takes the message by value, so a caller that still needs the inbound
    /// form has to clone it first. `completed` messages pass through untouched;
    /// the engine routes them through the aggregation barrier instead.
    pub fn transform(&self, msg: RawMessage) -> OutboundMessage {
        let RawMessage {
            origin,
            correlation_id,
            mut body,
        } = msg;

        match origin {
            Origin::Inbox => {
                body.remove(FILESIZE_FIELD);
                body.remove(OPERATION_FIELD);
                body.insert(TYPE_FIELD.to_string(), Value::from(TYPE_INGEST));
            }
            Origin::Verified => {
                body.insert(TYPE_FIELD.to_string(), Value::from(TYPE_ACCESSION));
                self.stamp_id(&mut body, origin, ACCESSION_ID_FIELD);
            }
            Origin::StableIds => {
                body.insert(TYPE_FIELD.to_string(), Value::from(TYPE_MAPPING));
                self.stamp_id(&mut body, origin, DATASET_ID_FIELD);
            }
            Origin::Completed => {}
        }

        debug!(
            event = events::TRANSFORM_APPLIED,
            component = COMPONENT,
            origin = %origin,
            correlation_id = %correlation_id,
            body = %fields::format_body(&body),
            "rewrote message"
        );

        OutboundMessage {
            correlation_id,
            body,
        }
    }

    fn stamp_id(&self, body: &mut JsonObject, origin: Origin, field: &str) {
        let id = self.ids.next_id(IdKind::for_origin(origin));
        body.insert(field.to_string(), Value::from(id.into_string()));
    }
}
