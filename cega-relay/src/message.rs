/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Message model shared by every layer: origins, correlation ids, raw and
//! outbound messages and the envelope handed to a [`crate::QueueSink`].

use crate::error::RelayError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

pub type JsonObject = Map<String, Value>;

pub const TYPE_FIELD: &str = "type";
pub const USER_FIELD: &str = "user";
pub const ACCESSION_ID_FIELD: &str = "accession_id";
pub const ACCESSION_IDS_FIELD: &str = "accession_ids";
pub const DATASET_ID_FIELD: &str = "dataset_id";
pub const FILESIZE_FIELD: &str = "filesize";
pub const OPERATION_FIELD: &str = "operation";

pub const TYPE_INGEST: &str = "ingest";
pub const TYPE_ACCESSION: &str = "accession";
pub const TYPE_MAPPING: &str = "mapping";

pub const DEFAULT_EXCHANGE: &str = "localega.v1";
pub const DEFAULT_ROUTING_KEY: &str = "files";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_ENCODING_UTF8: &str = "UTF-8";

/// Queue a message was consumed from. Selects the rewrite rule.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Origin {
    #[strum(serialize = "inbox")]
    #[serde(rename = "inbox")]
    Inbox,
    #[strum(serialize = "verified")]
    #[serde(rename = "verified")]
    Verified,
    #[strum(serialize = "completed")]
    #[serde(rename = "completed")]
    Completed,
    #[strum(serialize = "stableIDs")]
    #[serde(rename = "stableIDs")]
    StableIds,
}

impl Origin {
    pub fn all() -> Vec<Origin> {
        Origin::iter().collect()
    }

    /// Parses a queue label, rejecting anything outside the known set.
    pub fn parse(label: &str) -> Result<Self, RelayError> {
        Origin::from_str(label).map_err(|_| RelayError::UnknownOrigin(label.to_string()))
    }

    /// Fully qualified name of the broker queue backing this origin.
    pub fn queue_name(&self) -> String {
        match self {
            Origin::StableIds => format!("v1.{}", self.as_ref()),
            _ => format!("v1.files.{}", self.as_ref()),
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Opaque token carried unchanged from an inbound message to its outbound derivatives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Undecoded unit handed out by a [`crate::QueueSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub body: Vec<u8>,
    pub correlation_id: CorrelationId,
}

impl Delivery {
    pub fn new(body: impl Into<Vec<u8>>, correlation_id: impl Into<CorrelationId>) -> Self {
        Self {
            body: body.into(),
            correlation_id: correlation_id.into(),
        }
    }

    pub fn from_json(
        body: &Value,
        correlation_id: impl Into<CorrelationId>,
    ) -> Result<Self, RelayError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|err| RelayError::Encode(err.to_string()))?;
        Ok(Self::new(bytes, correlation_id))
    }
}

/// Decoded inbound message tagged with its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMessage {
    pub origin: Origin,
    pub correlation_id: CorrelationId,
    pub body: JsonObject,
}

impl RawMessage {
    pub fn new(origin: Origin, correlation_id: impl Into<CorrelationId>, body: JsonObject) -> Self {
        Self {
            origin,
            correlation_id: correlation_id.into(),
            body,
        }
    }

    /// Decodes a delivery body; anything but a JSON object is a decode failure.
    pub fn decode(origin: Origin, delivery: Delivery) -> Result<Self, RelayError> {
        let decode_failed = |reason: String| RelayError::Decode { origin, reason };
        let value: Value = serde_json::from_slice(&delivery.body)
            .map_err(|err| decode_failed(err.to_string()))?;

        match value {
            Value::Object(body) => Ok(Self::new(origin, delivery.correlation_id, body)),
            other => {
                let reason = format!("expected a JSON object, found {}", json_kind(&other));
                Err(decode_failed(reason))
            }
        }
    }

    pub fn string_field(&self, field: &'static str) -> Result<&str, RelayError> {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .ok_or(RelayError::MissingField {
                origin: self.origin,
                field,
            })
    }
}

/// Rewritten message ready for publication. Always carries a `type`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    pub correlation_id: CorrelationId,
    pub body: JsonObject,
}

impl OutboundMessage {
    pub fn message_type(&self) -> Option<&str> {
        self.body.get(TYPE_FIELD).and_then(Value::as_str)
    }

    pub fn field(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }
}

/// Publication unit: body plus the broker properties the downstream pipeline expects.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundEnvelope {
    pub exchange: String,
    pub routing_key: String,
    pub correlation_id: CorrelationId,
    pub content_type: &'static str,
    pub content_encoding: &'static str,
    pub persistent: bool,
    pub priority: u8,
    pub body: JsonObject,
}

impl OutboundEnvelope {
    pub fn message_type(&self) -> Option<&str> {
        self.body.get(TYPE_FIELD).and_then(Value::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
