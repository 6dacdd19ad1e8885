//! Domain services sitting between the HTTP handlers and the repositories.
//!
//! - [`auth::AuthService`] -- sign-up, sign-in, refresh rotation, token parsing.
//! - [`books::BookService`] -- book CRUD with an audit record per operation.
//!
//! Both emit a [`bookshelf_core::audit::LogItem`] after each successful
//! mutation or read and propagate audit failures to the caller.

pub mod auth;
pub mod books;

pub use auth::{AuthError, AuthService, TokenPair};
pub use books::{BookError, BookService};
