//! Counters handed back after a clean run.

use crate::message::Origin;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OriginStats {
    /// Deliveries taken from the origin queue.
    pub received: u64,
    /// Envelopes accepted by the sink on behalf of the origin.
    pub published: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelayReport {
    pub per_origin: BTreeMap<Origin, OriginStats>,
}

impl RelayReport {
    pub fn new(per_origin: BTreeMap<Origin, OriginStats>) -> Self {
        Self { per_origin }
    }

    pub fn origin(&self, origin: Origin) -> Option<OriginStats> {
        self.per_origin.get(&origin).copied()
    }

    pub fn received(&self) -> u64 {
        self.per_origin.values().map(|stats| stats.received).sum()
    }

    pub fn published(&self) -> u64 {
        self.per_origin.values().map(|stats| stats.published).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::{OriginStats, RelayReport};
    use crate::message::Origin;
    use std::collections::BTreeMap;

    #[test]
    fn totals_sum_every_origin() {
        let report = RelayReport::new(BTreeMap::from([
            (
                Origin::Inbox,
                OriginStats {
                    received: 3,
                    published: 3,
                },
            ),
            (
                Origin::Completed,
                OriginStats {
                    received: 4,
                    published: 1,
                },
            ),
        ]));

        assert_eq!(report.received(), 7);
        assert_eq!(report.published(), 4);
        assert_eq!(report.origin(Origin::Verified), None);
    }

    #[test]
    fn serializes_origins_by_label() {
        let per_origin = BTreeMap::from([(Origin::StableIds, OriginStats::default())]);
        let report = RelayReport::new(per_origin);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"per_origin": {"stableIDs": {"received": 0, "published": 0}}})
        );
    }
}
