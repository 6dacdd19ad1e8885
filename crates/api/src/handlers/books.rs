//! Handlers for the `/books` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookshelf_core::types::DbId;
use bookshelf_db::models::book::{Book, CreateBook, UpdateBook};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::cancel::RequestCancel;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: DbId,
}

/// GET /books
pub async fn list_books(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.books.get_all(&cancel).await?;
    Ok(Json(books))
}

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Json(input): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = state.books.create(input, &cancel).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /books/{id}
pub async fn get_book(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Path(id): Path<DbId>,
) -> AppResult<Json<Book>> {
    let book = state.books.get_by_id(id, &cancel).await?;
    Ok(Json(book))
}

/// PUT /books/{id}
///
/// Sparse update: only fields present in the body are written.
pub async fn update_book(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.books.update(id, &patch, &cancel).await?;
    Ok(Json(book))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(state): State<AppState>,
    RequestCancel(cancel): RequestCancel,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.books.delete(id, &cancel).await?;
    Ok(StatusCode::NO_CONTENT)
}
