//! Refresh session model and DTOs.

use bookshelf_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `refresh_tokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub expires_at: Timestamp,
}

impl RefreshSession {
    /// Whether the session is past its expiry, compared at whole-second granularity.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now.timestamp() > self.expires_at.timestamp()
    }
}

/// DTO for creating a new refresh session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token: String,
    pub expires_at: Timestamp,
}
