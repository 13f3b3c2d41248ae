//! Per-origin consumption loop feeding the egress publisher.

use crate::api::report::OriginStats;
use crate::data_plane::egress_worker::Publisher;
use crate::error::RelayError;
use crate::message::{Delivery, Origin, OutboundMessage, RawMessage};
use crate::observability::{events, fields};
use crate::routing::aggregation::{DatasetMapping, SharedBarrier};
use crate::routing::transform::MessageTransformer;
use crate::runtime::shutdown::ShutdownSignal;
use crate::transport::QueueSource;
use tracing::{debug, error, info, trace};

const COMPONENT: &str = "ingress_listener";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    WaitingForMessage,
    Processing,
    Publishing,
}

/// How messages of one origin become outbound messages.
pub(crate) enum IngressRoute {
    /// One-to-one rewrite.
    Direct(MessageTransformer),
    /// Buffer in the barrier; publish whatever a release produces.
    Aggregate(SharedBarrier),
}

pub(crate) struct IngressListener {
    origin: Origin,
    source: Box<dyn QueueSource>,
    route: IngressRoute,
    publisher: Publisher,
    shutdown: ShutdownSignal,
    state: LoopState,
}

impl IngressListener {
    pub(crate) fn new(
        origin: Origin,
        source: Box<dyn QueueSource>,
        route: IngressRoute,
        publisher: Publisher,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            origin,
            source,
            route,
            publisher,
            shutdown,
            state: LoopState::WaitingForMessage,
        }
    }

    fn transition(&mut self, next: LoopState) {
        trace!(
            component = COMPONENT,
            origin = %self.origin,
            from = ?self.state,
            to = ?next,
            "loop state change"
        );
        self.state = next;
    }

    /// Runs until the source closes or shutdown is requested. Any failure ends
    /// the loop and is returned as is.
    pub(crate) async fn run(mut self) -> Result<OriginStats, RelayError> {
        let origin = self.origin;
        let mut stats = OriginStats::default();

        info!(
            event = events::INGRESS_LOOP_START,
            component = COMPONENT,
            origin = %origin,
            queue = %origin.queue_name(),
            "consuming messages from {} queue",
            origin.queue_name()
        );

        loop {
            self.transition(LoopState::WaitingForMessage);

            let received = tokio::select! {
                biased;
                _ = self.shutdown.requested() => None,
                received = self.source.recv() => Some(received),
            };

            let delivery = match received {
                None => {
                    debug!(component = COMPONENT, origin = %origin, "shutdown requested");
                    break;
                }
                Some(Ok(None)) => {
                    debug!(component = COMPONENT, origin = %origin, "source closed");
                    break;
                }
                Some(Ok(Some(delivery))) => delivery,
                Some(Err(err)) => {
                    error!(
                        event = events::INGRESS_SOURCE_FAILED,
                        component = COMPONENT,
                        origin = %origin,
                        err = %err,
                        "unable to consume from source"
                    );
                    return Err(RelayError::Source {
                        origin,
                        reason: err.to_string(),
                    });
                }
            };
            stats.received += 1;

            self.transition(LoopState::Processing);
            let outbound = Self::process(origin, &self.route, delivery).await?;

            self.transition(LoopState::Publishing);
            for msg in outbound {
                self.publisher.publish(origin, msg).await?;
                stats.published += 1;
            }
        }

        info!(
            event = events::INGRESS_LOOP_STOP,
            component = COMPONENT,
            origin = %origin,
            received = stats.received,
            published = stats.published,
            "stopped consuming"
        );
        Ok(stats)
    }

    // Takes the route instead of `&self`: the source is `Send` but not `Sync`.
    async fn process(
        origin: Origin,
        route: &IngressRoute,
        delivery: Delivery,
    ) -> Result<Vec<OutboundMessage>, RelayError> {
        debug!(
            event = events::INGRESS_RECEIVE,
            component = COMPONENT,
            origin = %origin,
            correlation_id = %delivery.correlation_id,
            body = %fields::format_raw_body(&delivery.body),
            "received a message from {origin} queue"
        );

        let msg = RawMessage::decode(origin, delivery).map_err(|err| {
            error!(
                event = events::INGRESS_DECODE_FAILED,
                component = COMPONENT,
                origin = %origin,
                err = %err,
                "failed to decode message"
            );
            err
        })?;

        match route {
            IngressRoute::Direct(transformer) => Ok(vec![transformer.transform(msg)]),
            IngressRoute::Aggregate(barrier) => {
                let mappings = barrier.lock().await.admit(msg)?;
                Ok(mappings
                    .into_iter()
                    .map(DatasetMapping::into_outbound)
                    .collect())
            }
        }
    }
}
