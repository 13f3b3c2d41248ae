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

//! Outward [`RelayEngine`] contract: register origin sources, then run every
//! consumption loop against one sink until the sources close, shutdown is
//! requested or a loop fails.

use crate::api::config::RelayConfig;
use crate::api::report::RelayReport;
use crate::control_plane::origin_table::OriginTable;
use crate::data_plane::egress_worker::Publisher;
use crate::data_plane::ingress_listener::{IngressListener, IngressRoute};
use crate::error::RelayError;
use crate::ids::IdGenerator;
use crate::message::Origin;
use crate::observability::events;
use crate::routing::aggregation::{AggregationBarrier, SharedBarrier};
use crate::routing::transform::MessageTransformer;
use crate::runtime::shutdown::ShutdownHandle;
use crate::runtime::worker_runtime::{join_origin_loops, spawn_origin_loop, LoopOutcome};
use crate::transport::{QueueSink, QueueSource};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const COMPONENT: &str = "engine";

pub struct RelayEngine {
    config: RelayConfig,
    ids: IdGenerator,
    origins: OriginTable,
    barrier: SharedBarrier,
    shutdown: ShutdownHandle,
}

impl RelayEngine {
    pub fn new(config: RelayConfig) -> Self {
        let ids = IdGenerator::new();
        let barrier = AggregationBarrier::new(ids, config.release_threshold).into_shared();

        debug!(
            component = COMPONENT,
            release_threshold = config.release_threshold.get(),
            publish_timeout_ms = config.publish_timeout.as_millis() as u64,
            exchange = config.exchange.as_str(),
            routing_key = config.routing_key.as_str(),
            "relay engine created"
        );

        Self {
            config,
            ids,
            origins: OriginTable::new(),
            barrier,
            shutdown: ShutdownHandle::new(),
        }
    }

    /// Registers the source to consume `origin` from. Each origin takes at most
    /// one source.
    pub fn add_origin(
        &mut self,
        origin: Origin,
        source: impl QueueSource + 'static,
    ) -> Result<(), RelayError> {
        if !self.origins.insert(origin, Box::new(source)) {
            warn!(
                event = events::ORIGIN_REGISTER_REJECTED,
                component = COMPONENT,
                origin = %origin,
                "origin already has a source"
            );
            return Err(RelayError::OriginAlreadyRegistered(origin));
        }

        debug!(
            event = events::ORIGIN_REGISTER,
            component = COMPONENT,
            origin = %origin,
            queue = %origin.queue_name(),
            "registered origin source"
        );
        Ok(())
    }

    pub fn remove_origin(&mut self, origin: Origin) -> Result<(), RelayError> {
        if self.origins.remove(origin) {
            debug!(component = COMPONENT, origin = %origin, "removed origin source");
            Ok(())
        } else {
            Err(RelayError::OriginNotRegistered(origin))
        }
    }

    /// Registered origins in queue order.
    pub fn origins(&self) -> impl Iterator<Item = Origin> + '_ {
        self.origins.origins()
    }

    /// Trigger that stops a running engine at the next wait point of each loop.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// The barrier fed by the `completed` loop.
    pub fn shared_barrier(&self) -> SharedBarrier {
        self.barrier.clone()
    }

    /// Consumes every registered origin concurrently and publishes to `sink`.
    ///
    /// Returns once all loops have ended. The first fatal error stops the other
    /// loops and is returned after they have wound down.
    pub async fn run(mut self, sink: Arc<dyn QueueSink>) -> Result<RelayReport, RelayError> {
        if self.origins.is_empty() {
            error!(
                event = events::ENGINE_ABORT,
                component = COMPONENT,
                "no origins registered, nothing to consume"
            );
            return Err(RelayError::NoOrigins);
        }

        let publisher = Publisher::new(
            sink,
            &self.config.exchange,
            &self.config.routing_key,
            self.config.publish_timeout,
        );
        let transformer = MessageTransformer::new(self.ids);

        let origins: Vec<String> = self.origins().map(|origin| origin.to_string()).collect();
        info!(
            event = events::ENGINE_START,
            component = COMPONENT,
            origins = ?origins,
            "starting consumption loops"
        );

        let mut tasks: JoinSet<LoopOutcome> = JoinSet::new();
        for (origin, source) in self.origins.drain() {
            let route = match origin {
                Origin::Completed => IngressRoute::Aggregate(self.barrier.clone()),
                _ => IngressRoute::Direct(transformer),
            };
            let listener = IngressListener::new(
                origin,
                source,
                route,
                publisher.clone(),
                self.shutdown.signal(),
            );
            spawn_origin_loop(&mut tasks, origin, listener.run());
        }

        let report = RelayReport::new(join_origin_loops(tasks, &self.shutdown).await?);

        let buffered = self.barrier.lock().await.batch().len();
        if buffered > 0 {
            warn!(
                component = COMPONENT,
                buffered,
                threshold = self.config.release_threshold.get(),
                "stopping with completed messages below the release threshold"
            );
        }

        info!(
            event = events::ENGINE_STOP,
            component = COMPONENT,
            received = report.received(),
            published = report.published(),
            "all consumption loops stopped"
        );
        Ok(report)
    }
}
