//! Typed failures surfaced by the relay.
//!
//! Every variant is fatal for the engine. The loop that hit it stops and
//! requests shutdown. The remaining loops stop at their next wait point, a
//! publish already in flight still completes or hits its deadline, and once
//! every loop has been joined the first error is handed back to the caller of
//! [`crate::RelayEngine::run`].

use crate::message::Origin;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`crate::QueueSource`] implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// Failure reported by a [`crate::QueueSink`] implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

#[derive(Debug, Error)]
pub enum RelayError {
    /// The delivery body is not a JSON object.
    #[error("failed to decode message from {origin} queue: {reason}")]
    Decode { origin: Origin, reason: String },

    /// A field the grouping logic reads is absent or not a string.
    #[error("message from {origin} queue is missing string field `{field}`")]
    MissingField { origin: Origin, field: &'static str },

    #[error("failed to publish message from {origin} queue: {reason}")]
    Publish { origin: Origin, reason: String },

    #[error("publishing message from {origin} queue timed out after {timeout:?}")]
    PublishTimeout { origin: Origin, timeout: Duration },

    #[error("failed to consume from {origin} queue: {reason}")]
    Source { origin: Origin, reason: String },

    #[error("failed to encode outbound message: {0}")]
    Encode(String),

    #[error("unknown queue origin: {0:?}")]
    UnknownOrigin(String),

    #[error("a source for {0} queue is already registered")]
    OriginAlreadyRegistered(Origin),

    #[error("no source for {0} queue is registered")]
    OriginNotRegistered(Origin),

    #[error("no queue origins registered")]
    NoOrigins,

    /// A consumption task ended without reporting back, e.g. it panicked.
    #[error("consumption task failed: {0}")]
    Task(String),
}

impl RelayError {
    /// `true` for failures caused by the message content rather than the plumbing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::MissingField { .. })
    }
}
