//! Registry of origin sources awaiting consumption.

use crate::message::Origin;
use crate::transport::QueueSource;
use std::collections::BTreeMap;

pub(crate) type OriginSources = BTreeMap<Origin, Box<dyn QueueSource>>;

#[derive(Default)]
pub(crate) struct OriginTable {
    sources: OriginSources,
}

impl OriginTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and drops `source` when the origin is already taken.
    pub(crate) fn insert(&mut self, origin: Origin, source: Box<dyn QueueSource>) -> bool {
        if self.sources.contains_key(&origin) {
            return false;
        }
        self.sources.insert(origin, source);
        true
    }

    pub(crate) fn remove(&mut self, origin: Origin) -> bool {
        self.sources.remove(&origin).is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub(crate) fn origins(&self) -> impl Iterator<Item = Origin> + '_ {
        self.sources.keys().copied()
    }

    /// Hands every registered source to the caller, leaving the table empty.
    pub(crate) fn drain(&mut self) -> OriginSources {
        std::mem::take(&mut self.sources)
    }
}
