//! Persistence layer for the bookshelf service.
//!
//! - [`repositories`] -- capability traits plus their PostgreSQL implementations.
//! - [`memory`] -- in-process implementation of the same traits.
//! - [`update`] -- builder for sparse, parameterized `UPDATE` statements.
//! - [`models`] -- row types and DTOs.

use sqlx::postgres::PgPoolOptions;

pub mod cancel;
pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod update;

pub use error::StoreError;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
