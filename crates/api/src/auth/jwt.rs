//! JWT access-token issuance/parsing and refresh-token generation.
//!
//! Access tokens are HMAC-signed JWTs whose `sub` claim is the user id as a
//! decimal string. Refresh tokens are opaque random hex strings persisted
//! verbatim in the session store.

use bookshelf_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Access token lifetime in minutes.
pub const ACCESS_TOKEN_TTL_MINS: i64 = 30;

/// Entropy of a refresh token in bytes (hex-encoded to twice as many chars).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Signing algorithms accepted when parsing. Tokens are always issued as HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id, as a decimal string.
    pub sub: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

/// Subject-only view used when parsing, so an absent or non-string `sub`
/// surfaces as [`TokenError::InvalidSubject`] rather than a decode failure.
#[derive(Debug, Deserialize)]
struct SubjectClaim {
    #[serde(default)]
    sub: Option<serde_json::Value>,
}

/// Signing secret and refresh-session lifetime.
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify access tokens.
    pub secret: String,
    /// Refresh session lifetime in days.
    pub refresh_token_ttl_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .finish()
    }
}

/// Why an access token was refused.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, unexpected algorithm, expired, or malformed.
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token verified but `sub` is missing or not a decimal id.
    #[error("Invalid token subject")]
    InvalidSubject,
}

/// Issue an HS256 access token for `user_id`, valid for
/// [`ACCESS_TOKEN_TTL_MINS`] from now.
pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ACCESS_TOKEN_TTL_MINS * 60,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify an access token and return the user id from its subject.
///
/// Only the HMAC family is accepted and expiry is checked with zero leeway.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<DbId, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.leeway = 0;

    let data = decode::<SubjectClaim>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    match data.claims.sub {
        Some(serde_json::Value::String(sub)) => {
            sub.parse::<DbId>().map_err(|_| TokenError::InvalidSubject)
        }
        _ => Err(TokenError::InvalidSubject),
    }
}

/// Generate an opaque refresh token from the OS-seeded thread RNG.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
