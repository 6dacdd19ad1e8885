//! Credential and session management.

use std::sync::Arc;

use bookshelf_core::audit::{AuditAction, AuditEntity, LogItem};
use bookshelf_core::error::CoreError;
use bookshelf_core::types::DbId;
use bookshelf_core::users::{SignInInput, SignUpInput};
use bookshelf_db::models::session::CreateSession;
use bookshelf_db::models::user::CreateUser;
use bookshelf_db::repositories::{SessionRepository, UsersRepository};
use bookshelf_db::StoreError;
use bookshelf_events::{AuditClient, AuditError};
use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::auth::jwt::{self, JwtConfig, TokenError};
use crate::auth::password::PasswordHasher;

/// An access token together with the refresh token that can replace it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Failures of the authentication flows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A user with this email already exists")]
    DuplicateEmail,

    /// No user matches the email and password digest.
    #[error("User not found")]
    UserNotFound,

    /// The refresh token is unknown or was already used.
    #[error("Refresh session not found")]
    SessionNotFound,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid token subject")]
    InvalidSubject,

    #[error("Persistence error: {0}")]
    Persistence(StoreError),

    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AuthError::Validation(msg),
            CoreError::Unauthorized(_) => AuthError::InvalidToken,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => AuthError::InvalidToken,
            TokenError::InvalidSubject => AuthError::InvalidSubject,
        }
    }
}

/// Issues and verifies credentials.
///
/// Holds the user and session stores, the audit client, the password hasher,
/// and the signing configuration. Cheap to share behind an `Arc`.
pub struct AuthService {
    users: Arc<dyn UsersRepository>,
    sessions: Arc<dyn SessionRepository>,
    audit: Arc<dyn AuditClient>,
    hasher: PasswordHasher,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        sessions: Arc<dyn SessionRepository>,
        audit: Arc<dyn AuditClient>,
        hasher: PasswordHasher,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            audit,
            hasher,
            jwt,
        }
    }

    /// Register a new user and return its id.
    pub async fn sign_up(
        &self,
        input: &SignUpInput,
        cancel: &CancellationToken,
    ) -> Result<DbId, AuthError> {
        input.validate().map_err(CoreError::from)?;

        let user = CreateUser {
            name: input.name.clone(),
            email: input.email.clone(),
            password: self.hasher.hash(&input.password),
            registered_at: Utc::now(),
        };

        let user_id = self.users.create(&user, cancel).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => AuthError::DuplicateEmail,
            other => AuthError::Persistence(other),
        })?;
        tracing::info!(user_id, "User registered");

        self.emit(
            LogItem::now(AuditEntity::User, AuditAction::Register, user_id),
            cancel,
        )
        .await?;

        Ok(user_id)
    }

    /// Exchange an email and password for a fresh token pair.
    pub async fn sign_in(
        &self,
        input: &SignInInput,
        cancel: &CancellationToken,
    ) -> Result<TokenPair, AuthError> {
        input.validate().map_err(CoreError::from)?;

        let digest = self.hasher.hash(&input.password);
        let user = self
            .users
            .get_by_credentials(&input.email, &digest, cancel)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::UserNotFound,
                other => AuthError::Persistence(other),
            })?;

        let pair = self.issue_tokens(user.id, cancel).await?;
        tracing::info!(user_id = user.id, "User signed in");

        self.emit(
            LogItem::now(AuditEntity::User, AuditAction::Login, user.id),
            cancel,
        )
        .await?;

        Ok(pair)
    }

    /// Rotate a refresh token.
    ///
    /// The presented session is consumed before its expiry is checked, so a
    /// token is never accepted twice and an expired one is also gone.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        cancel: &CancellationToken,
    ) -> Result<TokenPair, AuthError> {
        let session = self
            .sessions
            .get_and_consume(refresh_token, cancel)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => AuthError::SessionNotFound,
                other => AuthError::Persistence(other),
            })?;

        if session.is_expired_at(Utc::now()) {
            tracing::info!(user_id = session.user_id, "Expired refresh token presented");
            return Err(AuthError::RefreshTokenExpired);
        }

        self.issue_tokens(session.user_id, cancel).await
    }

    /// Verify an access token and return the user id it was issued for.
    pub fn parse_token(&self, token: &str) -> Result<DbId, AuthError> {
        Ok(jwt::validate_token(token, &self.jwt)?)
    }

    async fn issue_tokens(
        &self,
        user_id: DbId,
        cancel: &CancellationToken,
    ) -> Result<TokenPair, AuthError> {
        let access_token = jwt::generate_access_token(user_id, &self.jwt)
            .map_err(|e| AuthError::Internal(format!("Token generation error: {e}")))?;
        let refresh_token = jwt::generate_refresh_token();

        let session = CreateSession {
            user_id,
            token: refresh_token.clone(),
            expires_at: Utc::now() + Duration::days(self.jwt.refresh_token_ttl_days),
        };
        self.sessions
            .create(&session, cancel)
            .await
            .map_err(AuthError::Persistence)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn emit(&self, item: LogItem, cancel: &CancellationToken) -> Result<(), AuthError> {
        self.audit
            .send_log_request(&item, cancel)
            .await
            .map_err(|e| {
                tracing::warn!(
                    entity = %item.entity,
                    action = %item.action,
                    entity_id = item.entity_id,
                    error = %e,
                    "Audit delivery failed"
                );
                AuthError::Audit(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use bookshelf_db::memory::MemoryStore;
    use bookshelf_events::RecordingAuditClient;

    use super::*;

    fn service(store: &MemoryStore, audit: &RecordingAuditClient) -> AuthService {
        AuthService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(audit.clone()),
            PasswordHasher::new("salt"),
            JwtConfig {
                secret: "unit-test-secret".to_string(),
                refresh_token_ttl_days: 30,
            },
        )
    }

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput {
            name: "A".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
        }
    }

    fn sign_in_input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_yields_tokens_for_that_user() {
        let store = MemoryStore::new();
        let audit = RecordingAuditClient::new();
        let svc = service(&store, &audit);
        let cancel = CancellationToken::new();

        let id = svc.sign_up(&sign_up_input("a@x.com"), &cancel).await.unwrap();
        let pair = svc
            .sign_in(&sign_in_input("a@x.com", "pw"), &cancel)
            .await
            .unwrap();

        assert_eq!(svc.parse_token(&pair.access_token).unwrap(), id);
        assert_eq!(pair.refresh_token.len(), 64);
        assert_eq!(store.session_count(), 1);

        let actions: Vec<_> = audit.items().iter().map(|i| i.action).collect();
        assert_eq!(actions, vec![AuditAction::Register, AuditAction::Login]);
    }

    #[tokio::test]
    async fn wrong_password_is_user_not_found() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());
        let cancel = CancellationToken::new();
        svc.sign_up(&sign_up_input("a@x.com"), &cancel).await.unwrap();

        let result = svc.sign_in(&sign_in_input("a@x.com", "nope"), &cancel).await;

        assert_matches!(result, Err(AuthError::UserNotFound));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());
        let cancel = CancellationToken::new();
        svc.sign_up(&sign_up_input("a@x.com"), &cancel).await.unwrap();

        let result = svc.sign_up(&sign_up_input("a@x.com"), &cancel).await;

        assert_matches!(result, Err(AuthError::DuplicateEmail));
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());
        let cancel = CancellationToken::new();
        svc.sign_up(&sign_up_input("a@x.com"), &cancel).await.unwrap();
        let pair = svc
            .sign_in(&sign_in_input("a@x.com", "pw"), &cancel)
            .await
            .unwrap();

        let rotated = svc.refresh_token(&pair.refresh_token, &cancel).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let replay = svc.refresh_token(&pair.refresh_token, &cancel).await;
        assert_matches!(replay, Err(AuthError::SessionNotFound));
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn expired_session_is_consumed_without_new_tokens() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());
        let cancel = CancellationToken::new();
        let stale = CreateSession {
            user_id: 1,
            token: "stale".to_string(),
            expires_at: Utc::now() - Duration::minutes(5),
        };
        SessionRepository::create(&store, &stale, &cancel)
            .await
            .unwrap();

        let result = svc.refresh_token("stale", &cancel).await;

        assert_matches!(result, Err(AuthError::RefreshTokenExpired));
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn audit_failure_fails_sign_up_but_keeps_the_user() {
        let store = MemoryStore::new();
        let audit = RecordingAuditClient::new();
        audit.set_failing(true);
        let svc = service(&store, &audit);

        let result = svc
            .sign_up(&sign_up_input("a@x.com"), &CancellationToken::new())
            .await;

        assert_matches!(result, Err(AuthError::Audit(_)));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());

        let result = svc
            .sign_up(&sign_up_input("not-an-email"), &CancellationToken::new())
            .await;

        assert_matches!(result, Err(AuthError::Validation(msg)) if msg.contains("email"));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_request_surfaces_store_cancellation() {
        let store = MemoryStore::new();
        let svc = service(&store, &RecordingAuditClient::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = svc.sign_up(&sign_up_input("a@x.com"), &cancel).await;

        assert_matches!(result, Err(AuthError::Persistence(StoreError::Cancelled)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let svc = service(&MemoryStore::new(), &RecordingAuditClient::new());
        assert_matches!(svc.parse_token("not.a.jwt"), Err(AuthError::InvalidToken));
    }
}
