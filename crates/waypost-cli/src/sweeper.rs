//! Background removal of abandoned staged uploads
//!
//! A client that disconnects mid-upload leaves its staged files behind.
//! They are removed once older than the configured staging lifetime.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;
use waypost_store::ContentStore;

/// Time between sweeps of the staging bucket
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Sweep `staging` every `every`, removing files older than `max_age`
pub fn spawn_staging_sweeper(
    staging: ContentStore,
    max_age: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = staging.sweep(max_age).await {
                warn!(bucket = %staging.bucket(), error = %e, "Staging sweep failed");
            }
        }
    })
}
