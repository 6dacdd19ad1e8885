//! Shared domain vocabulary for the bookshelf service.
//!
//! - [`types`] -- primary key and timestamp aliases.
//! - [`error`] -- domain-level error taxonomy.
//! - [`audit`] -- audit entities, actions, and the log record sent to the sink.
//! - [`users`] -- validated sign-up / sign-in inputs.

pub mod audit;
pub mod error;
pub mod types;
pub mod users;
