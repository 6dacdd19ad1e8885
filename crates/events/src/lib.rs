//! Audit side-channel for the bookshelf service.
//!
//! - [`AuditClient`] -- capability trait the services emit audit records through.
//! - [`HttpAuditClient`] -- posts records as JSON to an external audit sink.
//! - [`LogAuditClient`] -- writes records to the tracing log only.
//! - [`RecordingAuditClient`] -- keeps records in memory, optionally failing.

use async_trait::async_trait;
use bookshelf_core::audit::LogItem;
use tokio_util::sync::CancellationToken;

pub mod http;
pub mod log;
pub mod recording;

pub use http::HttpAuditClient;
pub use log::LogAuditClient;
pub use recording::RecordingAuditClient;

/// Error type for audit delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("Audit request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The audit sink answered with a non-2xx status code.
    #[error("Audit sink returned HTTP {0}")]
    Rejected(u16),

    /// The caller cancelled the request.
    #[error("Audit request cancelled")]
    Cancelled,

    /// The sink is known to be unavailable.
    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Best-effort notification of an external system about user and book activity.
///
/// Whether a failure aborts the surrounding operation is the caller's decision.
#[async_trait]
pub trait AuditClient: Send + Sync {
    async fn send_log_request(
        &self,
        item: &LogItem,
        cancel: &CancellationToken,
    ) -> Result<(), AuditError>;
}
