use std::sync::Arc;

use bookshelf_db::memory::MemoryStore;
use bookshelf_db::repositories::{
    BookRepo, BooksRepository, SessionRepo, SessionRepository, UserRepo, UsersRepository,
};
use bookshelf_db::DbPool;
use bookshelf_events::AuditClient;

use crate::auth::password::PasswordHasher;
use crate::config::ServerConfig;
use crate::services::{AuthService, BookService};

/// The three repository capabilities, type-erased.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub books: Arc<dyn BooksRepository>,
}

impl Repositories {
    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(UserRepo::new(pool.clone())),
            sessions: Arc::new(SessionRepo::new(pool.clone())),
            books: Arc::new(BookRepo::new(pool.clone())),
        }
    }

    /// In-process repositories, all views onto the same store.
    pub fn memory(store: &MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by middleware and the router).
    pub config: Arc<ServerConfig>,
    pub auth: Arc<AuthService>,
    pub books: Arc<BookService>,
    /// Database pool, when running against PostgreSQL. Used by `/health`.
    pub pool: Option<DbPool>,
}

impl AppState {
    /// Wire the services from configuration, repositories, and an audit client.
    pub fn new(
        config: ServerConfig,
        repos: Repositories,
        audit: Arc<dyn AuditClient>,
        pool: Option<DbPool>,
    ) -> Self {
        let auth = AuthService::new(
            repos.users,
            repos.sessions,
            Arc::clone(&audit),
            PasswordHasher::new(config.password_salt.clone()),
            config.jwt.clone(),
        );
        let books = BookService::new(repos.books, audit);

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            books: Arc::new(books),
            pool,
        }
    }
}
