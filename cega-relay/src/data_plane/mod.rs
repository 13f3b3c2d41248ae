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

//! Data-plane layer.
//!
//! Owns the per-origin consumption loops and the egress publisher. This layer
//! turns routing decisions into concrete receive, process and publish steps.
//!
//! ```
//! use cega_relay::{channel_sink, channel_source, Delivery, Origin, RelayConfig, RelayEngine};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut engine = RelayEngine::new(RelayConfig::default());
//! let (inbox_tx, inbox) = channel_source(8);
//! engine.add_origin(Origin::Inbox, inbox).unwrap();
//!
//! let body = json!({"user": "A", "filepath": "a.c4gh", "filesize": 10});
//! inbox_tx.send(Delivery::from_json(&body, "corr-1").unwrap()).await.unwrap();
//! drop(inbox_tx);
//!
//! let (sink, mut files) = channel_sink();
//! engine.run(Arc::new(sink)).await.unwrap();
//! assert_eq!(files.recv().await.unwrap().message_type(), Some("ingest"));
//! # });
//! ```

pub(crate) mod egress_worker;
pub(crate) mod ingress_listener;
