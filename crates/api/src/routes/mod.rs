pub mod auth;
pub mod books;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// ```text
/// /health                         service and database health
///
/// /auth/sign-up                   register (POST)
/// /auth/sign-in                   issue tokens (POST)
/// /auth/refresh                   rotate refresh token (GET, POST)
///
/// /books                          list (GET), create (POST)
/// /books/{id}                     get (GET), update (PUT), delete (DELETE)
/// ```
///
/// `/books` sits behind bearer authentication unless disabled in config.
pub fn app_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .merge(books::router(state))
}
