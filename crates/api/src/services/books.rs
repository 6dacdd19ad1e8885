//! Book CRUD with an audit record per operation.

use std::sync::Arc;

use bookshelf_core::audit::{AuditAction, AuditEntity, LogItem};
use bookshelf_core::types::DbId;
use bookshelf_db::models::book::{Book, CreateBook, UpdateBook};
use bookshelf_db::repositories::BooksRepository;
use bookshelf_db::StoreError;
use bookshelf_events::{AuditClient, AuditError};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Entity id recorded for list reads, which have no single subject.
const LIST_ENTITY_ID: DbId = 0;

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Book with id {0} not found")]
    NotFound(DbId),

    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

impl BookError {
    fn from_store(err: StoreError, id: DbId) -> Self {
        match err {
            StoreError::NotFound => BookError::NotFound(id),
            other => BookError::Persistence(other),
        }
    }
}

fn validate_id(id: DbId) -> Result<(), BookError> {
    if id <= 0 {
        return Err(BookError::Validation(format!(
            "book id must be positive, got {id}"
        )));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), BookError> {
    if value.trim().is_empty() {
        return Err(BookError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub struct BookService {
    repo: Arc<dyn BooksRepository>,
    audit: Arc<dyn AuditClient>,
}

impl BookService {
    pub fn new(repo: Arc<dyn BooksRepository>, audit: Arc<dyn AuditClient>) -> Self {
        Self { repo, audit }
    }

    /// Insert a book and return its id. A missing `published_at` becomes now.
    pub async fn create(
        &self,
        mut input: CreateBook,
        cancel: &CancellationToken,
    ) -> Result<DbId, BookError> {
        require_non_empty("name", &input.name)?;
        require_non_empty("author", &input.author)?;
        input.published_at.get_or_insert_with(Utc::now);

        let id = self
            .repo
            .create(&input, cancel)
            .await
            .map_err(BookError::Persistence)?;
        tracing::info!(book_id = id, "Book created");

        self.emit(LogItem::now(AuditEntity::Book, AuditAction::Create, id), cancel)
            .await?;
        Ok(id)
    }

    pub async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Book>, BookError> {
        let books = self
            .repo
            .get_all(cancel)
            .await
            .map_err(BookError::Persistence)?;

        self.emit(
            LogItem::now(AuditEntity::Book, AuditAction::Get, LIST_ENTITY_ID),
            cancel,
        )
        .await?;
        Ok(books)
    }

    pub async fn get_by_id(&self, id: DbId, cancel: &CancellationToken) -> Result<Book, BookError> {
        validate_id(id)?;
        let book = self
            .repo
            .get_by_id(id, cancel)
            .await
            .map_err(|e| BookError::from_store(e, id))?;

        self.emit(LogItem::now(AuditEntity::Book, AuditAction::Get, id), cancel)
            .await?;
        Ok(book)
    }

    /// Apply a sparse patch and return the resulting row.
    ///
    /// An empty patch changes nothing but still reports a missing book.
    pub async fn update(
        &self,
        id: DbId,
        patch: &UpdateBook,
        cancel: &CancellationToken,
    ) -> Result<Book, BookError> {
        validate_id(id)?;
        if let Some(name) = &patch.name {
            require_non_empty("name", name)?;
        }
        if let Some(author) = &patch.author {
            require_non_empty("author", author)?;
        }

        let book = self
            .repo
            .update(id, patch, cancel)
            .await
            .map_err(|e| BookError::from_store(e, id))?;
        tracing::info!(book_id = id, "Book updated");

        self.emit(LogItem::now(AuditEntity::Book, AuditAction::Update, id), cancel)
            .await?;
        Ok(book)
    }

    pub async fn delete(&self, id: DbId, cancel: &CancellationToken) -> Result<(), BookError> {
        validate_id(id)?;
        self.repo
            .delete(id, cancel)
            .await
            .map_err(|e| BookError::from_store(e, id))?;
        tracing::info!(book_id = id, "Book deleted");

        self.emit(LogItem::now(AuditEntity::Book, AuditAction::Delete, id), cancel)
            .await?;
        Ok(())
    }

    async fn emit(&self, item: LogItem, cancel: &CancellationToken) -> Result<(), BookError> {
        self.audit
            .send_log_request(&item, cancel)
            .await
            .map_err(|e| {
                tracing::warn!(
                    action = %item.action,
                    entity_id = item.entity_id,
                    error = %e,
                    "Audit delivery failed"
                );
                BookError::Audit(e)
            })
    }
}
