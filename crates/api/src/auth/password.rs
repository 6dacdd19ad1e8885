//! Salted SHA-1 password digests.
//!
//! The stored digest is the hex encoding of the salt bytes followed by the
//! raw SHA-1 of the password. This layout is kept so rows written by earlier
//! deployments keep verifying; it is not a modern password hash and offers
//! no work factor.

use std::fmt;

use sha1::{Digest, Sha1};

/// Deterministic password hasher keyed by a process-wide salt.
#[derive(Clone)]
pub struct PasswordHasher {
    salt: String,
}

impl PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Hash `password` into the stored digest form: `hex(salt ‖ sha1(password))`.
    ///
    /// Equal inputs always produce equal outputs, which is what lets sign-in
    /// look users up by `(email, digest)`.
    pub fn hash(&self, password: &str) -> String {
        let digest = Sha1::digest(password.as_bytes());

        let mut out = Vec::with_capacity(self.salt.len() + digest.len());
        out.extend_from_slice(self.salt.as_bytes());
        out.extend_from_slice(&digest);
        hex::encode(out)
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("salt", &"<redacted>")
            .finish()
    }
}
