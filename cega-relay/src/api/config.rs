//! Library-side engine settings.

use crate::message::{DEFAULT_EXCHANGE, DEFAULT_ROUTING_KEY};
use crate::routing::aggregation::ReleaseThreshold;
use std::time::Duration;

pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    /// Buffered `completed` messages needed before the barrier releases.
    pub release_threshold: ReleaseThreshold,
    /// Upper bound for a single publish.
    pub publish_timeout: Duration,
    pub exchange: String,
    pub routing_key: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            release_threshold: ReleaseThreshold::default(),
            publish_timeout: DEFAULT_PUBLISH_TIMEOUT,
            exchange: DEFAULT_EXCHANGE.to_string(),
            routing_key: DEFAULT_ROUTING_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RelayConfig;
    use std::time::Duration;

    #[test]
    fn defaults_target_the_files_queue() {
        let config = RelayConfig::default();
        assert_eq!(config.exchange, "localega.v1");
        assert_eq!(config.routing_key, "files");
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert_eq!(config.release_threshold.get(), 1);
    }
}
