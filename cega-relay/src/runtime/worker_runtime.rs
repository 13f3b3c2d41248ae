//! Spawning and fail-fast joining of the per-origin consumption tasks.

use crate::api::report::OriginStats;
use crate::error::RelayError;
use crate::message::Origin;
use crate::observability::events;
use crate::runtime::shutdown::ShutdownHandle;
use std::collections::BTreeMap;
use std::future::Future;
use tokio::task::JoinSet;
use tracing::error;

const COMPONENT: &str = "worker_runtime";

pub(crate) type LoopOutcome = (Origin, Result<OriginStats, RelayError>);

pub(crate) fn spawn_origin_loop<F>(tasks: &mut JoinSet<LoopOutcome>, origin: Origin, run_loop: F)
where
    F: Future<Output = Result<OriginStats, RelayError>> + Send + 'static,
{
    tasks.spawn(async move { (origin, run_loop.await) });
}

/// Waits for every loop. The first failure triggers shutdown for the others,
/// which are still joined so their in-flight publishes can settle, and is then
/// returned.
pub(crate) async fn join_origin_loops(
    mut tasks: JoinSet<LoopOutcome>,
    shutdown: &ShutdownHandle,
) -> Result<BTreeMap<Origin, OriginStats>, RelayError> {
    let mut stats = BTreeMap::new();
    let mut first_error: Option<RelayError> = None;

    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok((origin, Ok(origin_stats))) => {
                stats.insert(origin, origin_stats);
                continue;
            }
            Ok((origin, Err(err))) => {
                error!(
                    event = events::ENGINE_ABORT,
                    component = COMPONENT,
                    origin = %origin,
                    err = %err,
                    "consumption loop failed, stopping the engine"
                );
                err
            }
            Err(join_err) => {
                error!(
                    event = events::ENGINE_ABORT,
                    component = COMPONENT,
                    err = %join_err,
                    "consumption task did not complete, stopping the engine"
                );
                RelayError::Task(join_err.to_string())
            }
        };

        shutdown.shutdown();
        if first_error.is_none() {
            first_error = Some(failure);
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(stats),
    }
}

#[cfg(test)]
mod tests {
    use super::{join_origin_loops, spawn_origin_loop, LoopOutcome};
    use crate::api::report::OriginStats;
    use crate::error::RelayError;
    use crate::message::Origin;
    use crate::runtime::shutdown::ShutdownHandle;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test]
    async fn collects_stats_from_every_loop() {
        let shutdown = ShutdownHandle::new();
        let mut tasks: JoinSet<LoopOutcome> = JoinSet::new();
        for origin in [Origin::Inbox, Origin::Verified] {
            spawn_origin_loop(&mut tasks, origin, async {
                Ok(OriginStats {
                    received: 2,
                    published: 2,
                })
            });
        }

        let stats = join_origin_loops(tasks, &shutdown).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[&Origin::Inbox].published, 2);
        assert!(!shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn first_failure_stops_remaining_loops() {
        let shutdown = ShutdownHandle::new();
        let mut tasks: JoinSet<LoopOutcome> = JoinSet::new();

        let mut signal = shutdown.signal();
        spawn_origin_loop(&mut tasks, Origin::Inbox, async move {
            signal.requested().await;
            Ok(OriginStats::default())
        });
        spawn_origin_loop(&mut tasks, Origin::Completed, async {
            Err(RelayError::MissingField {
                origin: Origin::Completed,
                field: "user",
            })
        });

        let err = join_origin_loops(tasks, &shutdown).await.unwrap_err();
        assert!(matches!(err, RelayError::MissingField { .. }));
        assert!(shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn remaining_loops_are_joined_before_the_error_returns() {
        let shutdown = ShutdownHandle::new();
        let mut tasks: JoinSet<LoopOutcome> = JoinSet::new();
        let finished = Arc::new(AtomicBool::new(false));

        let mut signal = shutdown.signal();
        let flag = finished.clone();
        spawn_origin_loop(&mut tasks, Origin::Verified, async move {
            signal.requested().await;
            // still winding down after the stop request
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
            Ok(OriginStats::default())
        });
        spawn_origin_loop(&mut tasks, Origin::Inbox, async {
            Err(RelayError::Task("loop panicked".to_string()))
        });

        let err = join_origin_loops(tasks, &shutdown).await.unwrap_err();
        assert!(matches!(err, RelayError::Task(_)));
        assert!(finished.load(Ordering::SeqCst));
    }
}
