//! Authentication primitives.
//!
//! - [`password`] -- salted SHA-1 password digests.
//! - [`jwt`] -- access-token issuance and parsing, refresh-token generation.

pub mod jwt;
pub mod password;
