//! Egress publisher: wraps outbound messages in their broker envelope and hands
//! them to the sink under a deadline.

use crate::error::RelayError;
use crate::message::{
    Origin, OutboundEnvelope, OutboundMessage, CONTENT_ENCODING_UTF8, CONTENT_TYPE_JSON,
};
use crate::observability::{events, fields};
use crate::transport::QueueSink;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const COMPONENT: &str = "egress_worker";

#[derive(Clone)]
pub(crate) struct Publisher {
    sink: Arc<dyn QueueSink>,
    exchange: String,
    routing_key: String,
    timeout: Duration,
}

impl Publisher {
    pub(crate) fn new(
        sink: Arc<dyn QueueSink>,
        exchange: &str,
        routing_key: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            sink,
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            timeout,
        }
    }

    pub(crate) fn envelope(&self, msg: OutboundMessage) -> OutboundEnvelope {
        OutboundEnvelope {
            exchange: self.exchange.clone(),
            routing_key: self.routing_key.clone(),
            correlation_id: msg.correlation_id,
            content_type: CONTENT_TYPE_JSON,
            content_encoding: CONTENT_ENCODING_UTF8,
            persistent: true,
            priority: 0,
            body: msg.body,
        }
    }

    /// Publishes one message, failing if the sink errors or does not answer in time.
    pub(crate) async fn publish(
        &self,
        origin: Origin,
        msg: OutboundMessage,
    ) -> Result<(), RelayError> {
        let body = fields::format_body(&msg.body);
        let envelope = self.envelope(msg);
        let correlation_id = envelope.correlation_id.clone();

        debug!(
            event = events::EGRESS_SEND_ATTEMPT,
            component = COMPONENT,
            origin = %origin,
            correlation_id = %correlation_id,
            routing_key = self.routing_key.as_str(),
            "publishing message"
        );

        match tokio::time::timeout(self.timeout, self.sink.publish(envelope)).await {
            Ok(Ok(())) => {
                info!(
                    event = events::EGRESS_SEND_OK,
                    component = COMPONENT,
                    origin = %origin,
                    correlation_id = %correlation_id,
                    body = %body,
                    "sent message from {origin} queue to {}", self.routing_key
                );
                Ok(())
            }
            Ok(Err(err)) => {
                error!(
                    event = events::EGRESS_SEND_FAILED,
                    component = COMPONENT,
                    origin = %origin,
                    correlation_id = %correlation_id,
                    err = %err,
                    "failed to publish message"
                );
                Err(RelayError::Publish {
                    origin,
                    reason: err.to_string(),
                })
            }
            Err(_) => {
                error!(
                    event = events::EGRESS_SEND_TIMEOUT,
                    component = COMPONENT,
                    origin = %origin,
                    correlation_id = %correlation_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "publish deadline elapsed"
                );
                Err(RelayError::PublishTimeout {
                    origin,
                    timeout: self.timeout,
                })
            }
        }
    }
}
