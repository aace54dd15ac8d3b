use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::error::MonitorError;
use super::provider::{StatsProvider, cancellable};
use super::snapshot::{SharedSnapshot, SnapshotUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaticFact {
    Platform,
    PhysicalCores,
    LogicalThreads,
    CpuIdentity,
}

impl StaticFact {
    const ALL: [StaticFact; 4] = [
        StaticFact::Platform,
        StaticFact::PhysicalCores,
        StaticFact::LogicalThreads,
        StaticFact::CpuIdentity,
    ];

    async fn fetch(
        self,
        provider: &dyn StatsProvider,
        cancel: &CancellationToken,
    ) -> Result<SnapshotUpdate, MonitorError> {
        let update = match self {
            StaticFact::Platform => {
                SnapshotUpdate::Platform(cancellable(cancel, provider.host_info(cancel)).await?)
            }
            StaticFact::PhysicalCores => SnapshotUpdate::PhysicalCores(
                cancellable(cancel, provider.physical_core_count(cancel)).await?,
            ),
            StaticFact::LogicalThreads => SnapshotUpdate::LogicalThreads(
                cancellable(cancel, provider.logical_thread_count(cancel)).await?,
            ),
            StaticFact::CpuIdentity => SnapshotUpdate::CpuIdentity(
                cancellable(cancel, provider.cpu_identity(cancel)).await?,
            ),
        };
        Ok(update)
    }
}

/// Reads the static host facts once, all four in parallel.
///
/// Each fact is fetched and published by its own task. Every task runs to
/// completion before this returns; if any failed, the first failure to be
/// observed is returned and the snapshot must not be relied on.
pub async fn initialize(
    provider: Arc<dyn StatsProvider>,
    snapshot: &SharedSnapshot,
    cancel: &CancellationToken,
) -> Result<(), MonitorError> {
    let mut tasks = JoinSet::new();
    for fact in StaticFact::ALL {
        let provider = Arc::clone(&provider);
        let snapshot = snapshot.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let update = fact.fetch(provider.as_ref(), &cancel).await?;
            debug!(?fact, "static fact collected");
            snapshot.publish(update).await;
            Ok::<_, MonitorError>(())
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(e),
            Err(e) => failures.push(MonitorError::from(e)),
        }
    }

    if failures.is_empty() {
        info!("static host facts collected");
        return Ok(());
    }
    for failure in &failures {
        error!(error = %failure, "initialization task failed");
    }
    Err(failures.remove(0))
}
