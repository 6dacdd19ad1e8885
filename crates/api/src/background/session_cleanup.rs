//! Periodic purge of expired refresh sessions.
//!
//! Expired sessions are already refused at refresh time; this job only keeps
//! the `refresh_tokens` table from growing with tokens nobody will present.

use std::sync::Arc;
use std::time::Duration;

use bookshelf_db::repositories::SessionRepository;
use bookshelf_db::StoreError;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Run the cleanup loop until `cancel` is triggered.
///
/// The first purge happens immediately, then once per `interval`.
pub async fn run(
    sessions: Arc<dyn SessionRepository>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions.purge_expired(Utc::now(), &cancel).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                    Ok(purged) => tracing::info!(purged, "Session cleanup: purged expired sessions"),
                    Err(StoreError::Cancelled) => tracing::debug!("Session cleanup interrupted"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}
