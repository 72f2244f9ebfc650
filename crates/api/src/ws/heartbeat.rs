use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::ConnectionRegistry;

/// Time between two rounds of Ping frames.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every open sync connection each `period` until `cancel` fires.
///
/// Rounds with no open connections are skipped.
pub async fn run_heartbeat(
    registry: Arc<ConnectionRegistry>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if registry.connection_count().await == 0 {
                    continue;
                }
                let pinged = registry.ping_all().await;
                tracing::debug!(pinged, "Sync heartbeat");
            }
        }
    }
    tracing::debug!("Sync heartbeat stopped");
}
