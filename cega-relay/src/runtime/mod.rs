//! Runtime integration layer.
//!
//! Isolates task spawning, joining and shutdown signalling so the async
//! behavior stays localized and predictable for the rest of the crate.

pub(crate) mod shutdown;
pub(crate) mod worker_runtime;
