//! Repository for the `refresh_tokens` table.

use async_trait::async_trait;
use bookshelf_core::types::Timestamp;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::error::StoreError;
use crate::models::session::{CreateSession, RefreshSession};
use crate::repositories::SessionRepository;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, expires_at";

/// PostgreSQL-backed [`SessionRepository`].
#[derive(Debug, Clone)]
pub struct SessionRepo {
    pool: PgPool,
}

impl SessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SessionRepo {
    async fn create(
        &self,
        input: &CreateSession,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        let insert = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(input.user_id)
        .bind(&input.token)
        .bind(input.expires_at)
        .execute(&self.pool);

        cancellable(cancel, insert).await?;
        Ok(())
    }

    /// A single `DELETE ... RETURNING` so two concurrent redemptions of the
    /// same token cannot both succeed.
    async fn get_and_consume(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<RefreshSession, StoreError> {
        let query = format!("DELETE FROM refresh_tokens WHERE token = $1 RETURNING {COLUMNS}");
        let fetch = sqlx::query_as::<_, RefreshSession>(&query)
            .bind(token)
            .fetch_one(&self.pool);

        cancellable(cancel, fetch).await
    }

    async fn purge_expired(
        &self,
        now: Timestamp,
        cancel: &CancellationToken,
    ) -> Result<u64, StoreError> {
        let delete = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool);

        let result = cancellable(cancel, delete).await?;
        Ok(result.rows_affected())
    }
}
