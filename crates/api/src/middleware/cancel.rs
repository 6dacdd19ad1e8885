//! Per-request cancellation.
//!
//! [`attach_cancellation`] gives each request a [`CancellationToken`] that
//! fires when the request future is dropped, whether the client disconnected
//! or the timeout layer gave up. Store and audit calls race against it.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tokio_util::sync::CancellationToken;

/// Cancellation token of the current request.
#[derive(Debug, Clone)]
pub struct RequestCancel(pub CancellationToken);

pub async fn attach_cancellation(mut request: Request, next: Next) -> Response {
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    request.extensions_mut().insert(RequestCancel(token));
    next.run(request).await
}

impl<S: Send + Sync> FromRequestParts<S> for RequestCancel {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Routers built without the layer still get a token that never fires.
        Ok(parts
            .extensions
            .get::<RequestCancel>()
            .cloned()
            .unwrap_or_else(|| RequestCancel(CancellationToken::new())))
    }
}
