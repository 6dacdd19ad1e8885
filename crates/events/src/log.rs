//! Audit client that only writes to the tracing log.
//!
//! Used when no external audit sink is configured.

use async_trait::async_trait;
use bookshelf_core::audit::LogItem;
use tokio_util::sync::CancellationToken;

use crate::{AuditClient, AuditError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditClient;

#[async_trait]
impl AuditClient for LogAuditClient {
    async fn send_log_request(
        &self,
        item: &LogItem,
        _cancel: &CancellationToken,
    ) -> Result<(), AuditError> {
        tracing::info!(
            entity = %item.entity,
            action = %item.action,
            entity_id = item.entity_id,
            timestamp = %item.timestamp,
            "Audit"
        );
        Ok(())
    }
}
