//! Delivery of audit records to an external HTTP sink.
//!
//! [`HttpAuditClient`] sends one JSON-encoded [`LogItem`] per request via
//! HTTP POST. There is no retry: a failed delivery is reported to the caller,
//! which decides whether the surrounding operation fails.

use std::time::Duration;

use async_trait::async_trait;
use bookshelf_core::audit::LogItem;
use tokio_util::sync::CancellationToken;

use crate::{AuditClient, AuditError};

/// Posts audit records to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpAuditClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAuditClient {
    /// Create a client for `url` with a per-request `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, item: &LogItem) -> Result<(), AuditError> {
        let response = self.client.post(&self.url).json(item).send().await?;
        if !response.status().is_success() {
            return Err(AuditError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuditClient for HttpAuditClient {
    async fn send_log_request(
        &self,
        item: &LogItem,
        cancel: &CancellationToken,
    ) -> Result<(), AuditError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AuditError::Cancelled),
            result = self.try_send(item) => result,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use bookshelf_core::audit::{AuditAction, AuditEntity};

    use super::*;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn posts_item_as_json() {
        let received: Arc<Mutex<Vec<serde_json::Value>>> = Arc::default();
        let sink = Arc::clone(&received);
        let router = Router::new().route(
            "/logs",
            post(move |Json(body): Json<serde_json::Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().unwrap().push(body);
                    StatusCode::NO_CONTENT
                }
            }),
        );
        let base = serve(router).await;
        let client = HttpAuditClient::new(format!("{base}/logs"), Duration::from_secs(5)).unwrap();

        let item = LogItem::now(AuditEntity::Book, AuditAction::Create, 12);
        client
            .send_log_request(&item, &CancellationToken::new())
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["entity"], "BOOK");
        assert_eq!(received[0]["action"], "CREATE");
        assert_eq!(received[0]["entity_id"], 12);
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let router = Router::new().route("/logs", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = serve(router).await;
        let client = HttpAuditClient::new(format!("{base}/logs"), Duration::from_secs(5)).unwrap();

        let item = LogItem::now(AuditEntity::User, AuditAction::Login, 1);
        let result = client.send_log_request(&item, &CancellationToken::new()).await;

        assert_matches!(result, Err(AuditError::Rejected(503)));
    }

    #[tokio::test]
    async fn cancelled_request_returns_cancelled() {
        let client =
            HttpAuditClient::new("http://127.0.0.1:9/logs", Duration::from_secs(5)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let item = LogItem::now(AuditEntity::User, AuditAction::Login, 1);
        let result = client.send_log_request(&item, &cancel).await;

        assert_matches!(result, Err(AuditError::Cancelled));
    }

    #[tokio::test]
    async fn unreachable_sink_is_a_request_error() {
        // Port 9 (discard) is not expected to be listening.
        let client =
            HttpAuditClient::new("http://127.0.0.1:9/logs", Duration::from_secs(2)).unwrap();

        let item = LogItem::now(AuditEntity::Book, AuditAction::Get, 0);
        let result = client.send_log_request(&item, &CancellationToken::new()).await;

        assert_matches!(result, Err(AuditError::Request(_)));
    }
}
