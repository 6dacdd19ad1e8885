//! In-process implementation of every repository capability.
//!
//! Backs integration tests and local experiments that should not need a
//! PostgreSQL instance. Semantics mirror the PostgreSQL repositories: unique
//! emails, atomic get-and-consume of refresh sessions, `NotFound` on missing
//! rows, and [`StoreError::Cancelled`] once the caller's token fires.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bookshelf_core::types::{DbId, Timestamp};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::models::session::{CreateSession, RefreshSession};
use crate::models::user::{CreateUser, User};
use crate::repositories::{BooksRepository, SessionRepository, UsersRepository};

/// Name reported in [`StoreError::UniqueViolation`] for duplicate emails,
/// matching the PostgreSQL constraint.
const USERS_EMAIL_CONSTRAINT: &str = "uq_users_email";

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<RefreshSession>,
    books: Vec<Book>,
    next_user_id: DbId,
    next_session_id: DbId,
    next_book_id: DbId,
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

/// Shared in-memory tables. Cloning yields another handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding refresh sessions.
    pub fn session_count(&self) -> usize {
        self.lock().map(|t| t.sessions.len()).unwrap_or_default()
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.lock().map(|t| t.users.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    /// Check the token, then lock. No `.await` happens while the guard is held.
    fn enter(&self, cancel: &CancellationToken) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        self.lock()
    }
}

#[async_trait]
impl UsersRepository for MemoryStore {
    async fn create(
        &self,
        input: &CreateUser,
        cancel: &CancellationToken,
    ) -> Result<DbId, StoreError> {
        let mut tables = self.enter(cancel)?;
        if tables.users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::UniqueViolation(USERS_EMAIL_CONSTRAINT.into()));
        }

        let id = next_id(&mut tables.next_user_id);
        tables.users.push(User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            password: input.password.clone(),
            registered_at: input.registered_at,
        });
        Ok(id)
    }

    async fn get_by_credentials(
        &self,
        email: &str,
        password_hash: &str,
        cancel: &CancellationToken,
    ) -> Result<User, StoreError> {
        let tables = self.enter(cancel)?;
        tables
            .users
            .iter()
            .find(|u| u.email == email && u.password == password_hash)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(
        &self,
        input: &CreateSession,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let mut tables = self.enter(cancel)?;
        let id = next_id(&mut tables.next_session_id);
        tables.sessions.push(RefreshSession {
            id,
            user_id: input.user_id,
            token: input.token.clone(),
            expires_at: input.expires_at,
        });
        Ok(())
    }

    async fn get_and_consume(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<RefreshSession, StoreError> {
        let mut tables = self.enter(cancel)?;
        let index = tables
            .sessions
            .iter()
            .position(|s| s.token == token)
            .ok_or(StoreError::NotFound)?;
        Ok(tables.sessions.swap_remove(index))
    }

    async fn purge_expired(
        &self,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let mut tables = self.enter(cancel)?;
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.expires_at >= now);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[async_trait]
impl BooksRepository for MemoryStore {
    async fn create(
        &self,
        input: &CreateBook,
        cancel: &CancellationToken,
    ) -> Result<DbId, StoreError> {
        let mut tables = self.enter(cancel)?;
        let id = next_id(&mut tables.next_book_id);
        tables.books.push(Book {
            id,
            name: input.name.clone(),
            author: input.author.clone(),
            published_at: input.published_at.unwrap_or_else(Utc::now),
            rating: input.rating,
        });
        Ok(id)
    }

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Book>, StoreError> {
        let tables = self.enter(cancel)?;
        Ok(tables.books.clone())
    }

    async fn get_by_id(&self, id: DbId, cancel: &CancellationToken) -> Result<Book, StoreError> {
        let tables = self.enter(cancel)?;
        tables
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        id: DbId,
        patch: &UpdateBook,
        cancel: &CancellationToken,
    ) -> Result<Book, StoreError> {
        let mut tables = self.enter(cancel)?;
        let book = tables
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound)?;
        patch.apply_to(book);
        Ok(book.clone())
    }

    async fn delete(&self, id: DbId, cancel: &CancellationToken) -> Result<(), StoreError> {
        let mut tables = self.enter(cancel)?;
        let before = tables.books.len();
        tables.books.retain(|b| b.id != id);
        if tables.books.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Reader".to_string(),
            email: email.to_string(),
            password: "digest".to_string(),
            registered_at: Utc::now(),
        }
    }

    fn new_book(name: &str) -> CreateBook {
        CreateBook {
            name: name.to_string(),
            author: "Author".to_string(),
            published_at: None,
            rating: 1,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();

        let first = UsersRepository::create(&store, &new_user("a@x.com"), &cancel).await;
        assert_matches!(first, Ok(1));

        let second = UsersRepository::create(&store, &new_user("a@x.com"), &cancel).await;
        assert_matches!(second, Err(StoreError::UniqueViolation(c)) if c == "uq_users_email");
    }

    #[tokio::test]
    async fn credentials_must_match_exactly() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        UsersRepository::create(&store, &new_user("a@x.com"), &cancel)
            .await
            .unwrap();

        let found = store.get_by_credentials("a@x.com", "digest", &cancel).await;
        assert_matches!(found, Ok(user) if user.id == 1);

        let wrong = store.get_by_credentials("a@x.com", "other", &cancel).await;
        assert_matches!(wrong, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn sessions_are_consumed_once() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        let session = CreateSession {
            user_id: 1,
            token: "abc".to_string(),
            expires_at: Utc::now() + Duration::days(1),
        };
        SessionRepository::create(&store, &session, &cancel)
            .await
            .unwrap();

        let first = store.get_and_consume("abc", &cancel).await;
        assert_matches!(first, Ok(s) if s.user_id == 1);
        assert_eq!(store.session_count(), 0);

        let second = store.get_and_consume("abc", &cancel).await;
        assert_matches!(second, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        let now = Utc::now();
        for (token, offset) in [("old", -1), ("fresh", 1)] {
            let session = CreateSession {
                user_id: 1,
                token: token.to_string(),
                expires_at: now + Duration::hours(offset),
            };
            SessionRepository::create(&store, &session, &cancel)
                .await
                .unwrap();
        }

        let purged = store.purge_expired(now, &cancel).await.unwrap();

        assert_eq!(purged, 1);
        assert_eq!(store.session_count(), 1);
        assert!(store.get_and_consume("fresh", &cancel).await.is_ok());
    }

    #[tokio::test]
    async fn book_lifecycle_reports_missing_rows() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        let id = BooksRepository::create(&store, &new_book("Dune"), &cancel)
            .await
            .unwrap();

        let patch = UpdateBook {
            rating: Some(5),
            ..Default::default()
        };
        let updated = store.update(id, &patch, &cancel).await.unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.name, "Dune");

        let unchanged = store.update(id, &UpdateBook::default(), &cancel).await;
        assert_matches!(unchanged, Ok(book) if book == updated);

        store.delete(id, &cancel).await.unwrap();
        assert_matches!(store.get_by_id(id, &cancel).await, Err(StoreError::NotFound));
        assert_matches!(store.delete(id, &cancel).await, Err(StoreError::NotFound));
        assert_matches!(
            store.update(id, &patch, &cancel).await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn cancelled_calls_do_not_touch_state() {
        let store = MemoryStore::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = UsersRepository::create(&store, &new_user("a@x.com"), &cancel).await;

        assert_matches!(result, Err(StoreError::Cancelled));
        assert_eq!(store.user_count(), 0);
    }
}
