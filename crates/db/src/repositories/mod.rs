//! Repository layer.
//!
//! Each capability is an object-safe trait so services can be wired against
//! either the PostgreSQL repositories below or [`crate::memory::MemoryStore`].
//! Every method takes the caller's [`CancellationToken`]; implementations must
//! return [`StoreError::Cancelled`] promptly once it fires.

use async_trait::async_trait;
use bookshelf_core::types::{DbId, Timestamp};
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::models::book::{Book, CreateBook, UpdateBook};
use crate::models::session::{CreateSession, RefreshSession};
use crate::models::user::{CreateUser, User};

pub mod book_repo;
pub mod session_repo;
pub mod user_repo;

pub use book_repo::BookRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

/// Persistence of user accounts.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a user and return the store-assigned id.
    ///
    /// Fails with [`StoreError::UniqueViolation`] when the email is taken.
    async fn create(&self, input: &CreateUser, cancel: &CancellationToken)
        -> Result<DbId, StoreError>;

    /// Find the user whose email and password digest both match exactly.
    async fn get_by_credentials(
        &self,
        email: &str,
        password_hash: &str,
        cancel: &CancellationToken,
    ) -> Result<User, StoreError>;
}

/// Persistence of refresh sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(
        &self,
        input: &CreateSession,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError>;

    /// Fetch the session for `token` and delete it in the same operation.
    ///
    /// A second call with the same token fails with [`StoreError::NotFound`].
    async fn get_and_consume(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<RefreshSession, StoreError>;

    /// Delete sessions that expired before `now`. Returns the number removed.
    async fn purge_expired(
        &self,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError>;
}

/// Persistence of books.
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn create(&self, input: &CreateBook, cancel: &CancellationToken)
        -> Result<DbId, StoreError>;

    async fn get_all(&self, cancel: &CancellationToken) -> Result<Vec<Book>, StoreError>;

    async fn get_by_id(&self, id: DbId, cancel: &CancellationToken) -> Result<Book, StoreError>;

    /// Apply the present fields of `patch` and return the resulting row.
    ///
    /// An empty patch issues no `UPDATE` and returns the current row.
    async fn update(
        &self,
        id: DbId,
        patch: &UpdateBook,
        cancel: &CancellationToken,
    ) -> Result<Book, StoreError>;

    async fn delete(&self, id: DbId, cancel: &CancellationToken) -> Result<(), StoreError>;
}
