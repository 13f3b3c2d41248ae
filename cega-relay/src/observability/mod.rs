//! Shared observability vocabulary.
//!
//! Every `tracing` event emitted by the relay carries an `event` field taken from
//! [`events`] and a `component` field naming the emitting module, so log-based
//! harnesses can match on stable names instead of message text.

pub mod events;
pub mod fields;
