//! API facade layer.
//!
//! Keeps outward usage engine-centric while delegating consumption, routing and
//! publishing to the domain layers.
//!
//! ```
//! use cega_relay::{RelayConfig, RelayEngine, ReleaseThreshold};
//! use std::time::Duration;
//!
//! let config = RelayConfig {
//!     release_threshold: ReleaseThreshold::new(3).unwrap(),
//!     publish_timeout: Duration::from_secs(2),
//!     ..RelayConfig::default()
//! };
//! let engine = RelayEngine::new(config);
//! assert_eq!(engine.origins().count(), 0);
//! ```

pub mod config;
pub mod engine;
pub mod report;
