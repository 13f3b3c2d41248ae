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

//! Collaborator seams: where deliveries come from and where envelopes go.
//!
//! The broker connection itself lives outside this crate. [`ChannelSource`] and
//! [`ChannelSink`] are in-process stand-ins over `tokio::sync::mpsc` used by the
//! replay binary and by tests.

use crate::error::{SinkError, SourceError};
use crate::message::{Delivery, OutboundEnvelope};
use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};

/// Consumer side of one origin queue.
#[async_trait]
pub trait QueueSource: Send {
    /// Waits for the next delivery. `Ok(None)` means the queue is closed.
    async fn recv(&mut self) -> Result<Option<Delivery>, SourceError>;
}

/// Publisher towards the downstream queue.
#[async_trait]
pub trait QueueSink: Send + Sync {
    async fn publish(&self, envelope: OutboundEnvelope) -> Result<(), SinkError>;
}

pub struct ChannelSource {
    receiver: Receiver<Delivery>,
}

impl ChannelSource {
    pub fn new(receiver: Receiver<Delivery>) -> Self {
        Self { receiver }
    }
}

#[async_trait]
impl QueueSource for ChannelSource {
    async fn recv(&mut self) -> Result<Option<Delivery>, SourceError> {
        Ok(self.receiver.recv().await)
    }
}

/// Bounded in-memory queue. Dropping every sender closes the source.
pub fn channel_source(capacity: usize) -> (Sender<Delivery>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, ChannelSource::new(rx))
}

/// Forwards envelopes to an unbounded receiver; fails once the receiver is gone.
#[derive(Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<OutboundEnvelope>,
}

/// In-memory downstream queue; the receiver observes envelopes in publish order.
pub fn channel_sink() -> (ChannelSink, UnboundedReceiver<OutboundEnvelope>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelSink { sender }, receiver)
}

#[async_trait]
impl QueueSink for ChannelSink {
    async fn publish(&self, envelope: OutboundEnvelope) -> Result<(), SinkError> {
        self.sender
            .send(envelope)
            .map_err(|_| SinkError("outbound channel closed".to_string()))
    }
}
