//! Cancellation support for store calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::StoreError;

/// Drive `query` to completion unless `cancel` fires first.
///
/// When the token is cancelled the query future is dropped, which releases
/// its pooled connection, and [`StoreError::Cancelled`] is returned.
pub async fn cancellable<T, F>(cancel: &CancellationToken, query: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(StoreError::Cancelled),
        result = query => result.map_err(StoreError::from),
    }
}
