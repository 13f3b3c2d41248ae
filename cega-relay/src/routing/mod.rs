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

//! Routing layer.
//!
//! Decides what an inbound message turns into: a one-to-one rewrite through
//! [`transform::MessageTransformer`] or, for `completed` messages, buffering in
//! the [`aggregation::AggregationBarrier`] until a batch is released.
//!
//! ```
//! use cega_relay::{AggregationBarrier, CorrelationId, IdGenerator, Origin, RawMessage, ReleaseThreshold};
//! use serde_json::json;
//!
//! let mut barrier = AggregationBarrier::new(IdGenerator::new(), ReleaseThreshold::new(2).unwrap());
//! for (user, accession) in [("A", "x1"), ("B", "y1")] {
//!     let body = json!({"user": user, "accession_id": accession});
//!     let msg = RawMessage::new(Origin::Completed, "corr-1", body.as_object().unwrap().clone());
//!     barrier.ingest(msg).unwrap();
//! }
//! assert!(barrier.should_release());
//! assert_eq!(barrier.release(&CorrelationId::new("corr-1")).len(), 2);
//! ```

pub mod aggregation;
pub mod transform;
