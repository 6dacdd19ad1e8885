//! Repository for the `users` table.

use async_trait::async_trait;
use bookshelf_core::types::DbId;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cancel::cancellable;
use crate::error::StoreError;
use crate::models::user::{CreateUser, User};
use crate::repositories::UsersRepository;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password, registered_at";

/// PostgreSQL-backed [`UsersRepository`].
#[derive(Debug, Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for UserRepo {
    async fn create(
        &self,
        input: &CreateUser,
        cancel: &CancellationToken,
    ) -> Result<DbId, StoreError> {
        let query = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO users (name, email, password, registered_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password)
        .bind(input.registered_at)
        .fetch_one(&self.pool);

        cancellable(cancel, query).await
    }

    async fn get_by_credentials(
        &self,
        email: &str,
        password_hash: &str,
        cancel: &CancellationToken,
    ) -> Result<User, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND password = $2");
        let fetch = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool);

        cancellable(cancel, fetch).await
    }
}
