use axum::routing::get;
use axum::Router;

use crate::handlers::books;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Book routes. The collection answers with and without a trailing slash.
pub fn router(state: &AppState) -> Router<AppState> {
    let collection = get(books::list_books).post(books::create_book);

    let routes = Router::new()
        .route("/books", collection.clone())
        .route("/books/", collection)
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        );

    if state.config.books_require_auth {
        routes.route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
    } else {
        tracing::warn!("Book routes are served without authentication");
        routes
    }
}
