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

//! # cega-relay
//!
//! `cega-relay` stands in for the Central EGA side of a Local EGA deployment. It
//! consumes the upload, verification, completion and stable-id queues, rewrites
//! each message the way the central service would answer it and publishes the
//! answer to the `files` routing key of the `localega.v1` exchange.
//!
//! Typical usage is API-first and centered on [`RelayEngine`]: register one
//! [`QueueSource`] per origin, then run the engine against a [`QueueSink`].
//!
//! ```
//! use cega_relay::{channel_sink, channel_source, Delivery, Origin, RelayConfig, RelayEngine};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut engine = RelayEngine::new(RelayConfig::default());
//! let (verified_tx, verified) = channel_source(16);
//! let (completed_tx, completed) = channel_source(16);
//! engine.add_origin(Origin::Verified, verified).unwrap();
//! engine.add_origin(Origin::Completed, completed).unwrap();
//!
//! let file = json!({"user": "A", "filepath": "a.c4gh", "decrypted_checksums": []});
//! verified_tx.send(Delivery::from_json(&file, "c-1").unwrap()).await.unwrap();
//! let done = json!({"user": "A", "accession_id": "EGAF12000000001"});
//! completed_tx.send(Delivery::from_json(&done, "c-2").unwrap()).await.unwrap();
//! drop((verified_tx, completed_tx));
//!
//! let (sink, _files) = channel_sink();
//! let report = engine.run(Arc::new(sink)).await.unwrap();
//! assert_eq!(report.published(), 2);
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - API facade: outward `RelayEngine` surface, configuration and run report
//! - Control plane: origin registration and source ownership
//! - Routing: per-origin rewrite rules and the `completed` aggregation barrier
//! - Data plane: per-origin ingress loops and the deadline-bounded publisher
//! - Runtime: task spawning, fail-fast joining and shutdown signalling
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber. The
//! `mock-cega` binary and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod api;
pub use api::config::{RelayConfig, DEFAULT_PUBLISH_TIMEOUT};
pub use api::engine::RelayEngine;
pub use api::report::{OriginStats, RelayReport};

mod control_plane;
mod data_plane;

mod error;
pub use error::{RelayError, SinkError, SourceError};

mod ids;
pub use ids::{GeneratedId, IdGenerator, IdKind};

mod message;
pub use message::{
    CorrelationId, Delivery, JsonObject, Origin, OutboundEnvelope, OutboundMessage, RawMessage,
    DEFAULT_EXCHANGE, DEFAULT_ROUTING_KEY,
};

#[doc(hidden)]
pub mod observability;

mod routing;
pub use routing::aggregation::{
    AggregationBarrier, AggregationBatch, DatasetMapping, ReleaseThreshold, SharedBarrier,
};
pub use routing::transform::MessageTransformer;

mod runtime;
pub use runtime::shutdown::ShutdownHandle;

mod transport;
pub use transport::{
    channel_sink, channel_source, ChannelSink, ChannelSource, QueueSink, QueueSource,
};
