//! Handlers for the `/auth` resource (sign-up, sign-in, refresh).
//!
//! Access tokens travel in the JSON body; refresh tokens only ever travel
//! in the `refresh-token` cookie.

use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use bookshelf_core::types::DbId;
use bookshelf_core::users::{SignInInput, SignUpInput};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::cancel::RequestCancel;
use crate::services::TokenPair;
use crate::state::AppState;

/// Name of the cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh-token";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub id: DbId,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Cookies
// ---------------------------------------------------------------------------

fn refresh_cookie(token: &str) -> String {
    format!("{REFRESH_COOKIE}={token}; HttpOnly")
}

/// Find the refresh token among all `Cookie` headers.
///
/// Surrounding quotes are tolerated for clients that quote cookie values.
fn read_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REFRESH_COOKIE)
        .map(|(_, value)| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
        .filter(|value| !value.is_empty())
}

/// Body carries the access token; the refresh token is set as a cookie.
fn token_response(pair: TokenPair) -> impl IntoResponse {
    (
        [(SET_COOKIE, refresh_cookie(&pair.refresh_token))],
        Json(TokenResponse {
            token: pair.access_token,
        }),
    )
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Json(input): Json<SignUpInput>,
) -> AppResult<Json<SignUpResponse>> {
    let id = state.auth.sign_up(&input, &cancel).await?;
    Ok(Json(SignUpResponse { id }))
}

/// POST /auth/sign-in
///
/// Returns `{"token": <access token>}` and sets the `refresh-token` cookie.
pub async fn sign_in(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Json(input): Json<SignInInput>,
) -> AppResult<impl IntoResponse> {
    let pair = state.auth.sign_in(&input, &cancel).await?;
    Ok(token_response(pair))
}

/// GET|POST /auth/refresh
///
/// Consumes the `refresh-token` cookie and answers like sign-in.
pub async fn refresh(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let token = read_refresh_cookie(&headers).ok_or_else(|| {
        AppError::BadRequest(format!("Missing {REFRESH_COOKIE} cookie"))
    })?;

    let pair = state.auth.refresh_token(&token, &cancel).await?;
    Ok(token_response(pair))
}
