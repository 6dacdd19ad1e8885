//! User entity model and DTOs.

use bookshelf_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// `password` holds the salted digest, never the plaintext. This type is
/// deliberately not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub registered_at: Timestamp,
}

/// DTO for creating a new user. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub registered_at: Timestamp,
}
