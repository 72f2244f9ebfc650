//! Periodic removal of accounts that never completed their first login.
//!
//! Registration creates an `init` user; the first successful OTP login marks
//! it `verified`. Users still `init` after the retention window are deleted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabsync_core::types::Timestamp;
use tabsync_db::store::UserStore;
use tabsync_db::StoreResult;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Delete `init` users created more than `retention_hours` before `now`.
pub async fn sweep_once(
    users: &dyn UserStore,
    retention_hours: i64,
    now: Timestamp,
) -> StoreResult<u64> {
    let cutoff = now - chrono::Duration::hours(retention_hours);
    users.delete_unverified_before(cutoff).await
}

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(users: Arc<dyn UserStore>, retention_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_hours,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Unverified account sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Unverified account sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(users.as_ref(), retention_hours, Utc::now()).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Unverified sweep: removed stale accounts");
                        } else {
                            tracing::debug!("Unverified sweep: nothing to remove");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Unverified sweep failed");
                    }
                }
            }
        }
    }
}
