//! Audit client that keeps every record in memory.
//!
//! Lets tests assert on emitted audit content and simulate an outage of the
//! audit sink with [`RecordingAuditClient::set_failing`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bookshelf_core::audit::LogItem;
use tokio_util::sync::CancellationToken;

use crate::{AuditClient, AuditError};

/// Cloning yields another handle to the same record list.
#[derive(Debug, Clone, Default)]
pub struct RecordingAuditClient {
    items: Arc<Mutex<Vec<LogItem>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingAuditClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, every subsequent send fails with [`AuditError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the records received so far.
    pub fn items(&self) -> Vec<LogItem> {
        self.items.lock().map(|i| i.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditClient for RecordingAuditClient {
    async fn send_log_request(
        &self,
        item: &LogItem,
        cancel: &CancellationToken,
    ) -> Result<(), AuditError> {
        if cancel.is_cancelled() {
            return Err(AuditError::Cancelled);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError::Unavailable("recording client set to fail".into()));
        }
        self.items
            .lock()
            .map_err(|_| AuditError::Unavailable("recording client lock poisoned".into()))?
            .push(item.clone());
        Ok(())
    }
}
