//! Request middleware and extractors.
//!
//! - [`auth::AuthUser`] -- extracts the authenticated user from a Bearer token.
//! - [`auth::require_auth`] -- route layer that rejects unauthenticated requests.
//! - [`cancel::attach_cancellation`] -- gives every request a cancellation token.

pub mod auth;
pub mod cancel;
