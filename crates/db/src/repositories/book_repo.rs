//! Repository for the `books` table.

use async_trait::async_trait;
use bookshelf_core::types::DbId;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::error::StoreError;
use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::repositories::BooksRepository;
use crate::update::{UpdateBuilder, UpdateStatement};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, author, published_at, rating";

/// Build the `UPDATE` for a book patch, or `None` if the patch is empty.
///
/// Fields are visited in declaration order: `name`, `author`,
/// `published_at`, `rating`.
pub fn build_book_update(id: DbId, patch: &UpdateBook) -> Option<UpdateStatement> {
    UpdateBuilder::new("books")
        .set_opt("name", patch.name.clone())
        .set_opt("author", patch.author.clone())
        .set_opt("published_at", patch.published_at)
        .set_opt("rating", patch.rating)
        .returning(COLUMNS)
        .build(id)
}

/// PostgreSQL-backed [`BooksRepository`].
#[derive(Debug, Clone)]
pub struct BookRepo {
    pool: PgPool,
}

impl BookRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksRepository for BookRepo {
    /// If `published_at` is `None`, defaults to `NOW()`.
    async fn create(
        &self,
        input: &CreateBook,
        cancel: &CancellationToken,
    ) -> Result<DbId, StoreError> {
        let insert = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO books (name, author, published_at, rating)
             VALUES ($1, $2, COALESCE($3, NOW()), $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.author)
        .bind(input.published_at)
        .bind(input.rating)
        .fetch_one(&self.pool);

        cancellable(cancel, insert).await
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Book>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM books ORDER BY id");
        let fetch = sqlx::query_as::<_, Book>(&query).fetch_all(&self.pool);
        cancellable(cancel, fetch).await
    }

    async fn get_by_id(&self, id: DbId, cancel: &CancellationToken) -> Result<Book, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM books WHERE id = $1");
        let fetch = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_one(&self.pool);
        cancellable(cancel, fetch).await
    }

    async fn update(
        &self,
        id: DbId,
        patch: &UpdateBook,
        cancel: &CancellationToken,
    ) -> Result<Book, StoreError> {
        let Some(statement) = build_book_update(id, patch) else {
            tracing::debug!(book_id = id, "Empty book patch, skipping UPDATE");
            return self.get_by_id(id, cancel).await;
        };

        let fetch = statement.query_as::<Book>().fetch_one(&self.pool);
        cancellable(cancel, fetch).await
    }

    async fn delete(&self, id: DbId, cancel: &CancellationToken) -> Result<(), StoreError> {
        let delete = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool);

        let result = cancellable(cancel, delete).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
