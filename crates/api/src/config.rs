use std::fmt::Display;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Startup configuration problems. The binary refuses to start on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Where audit records go.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Sink URL. `None` means records are only written to the log.
    pub url: Option<String>,
    /// Per-request timeout for the HTTP sink.
    pub timeout_secs: u64,
}

/// Server configuration loaded from environment variables.
///
/// Everything except the two secrets has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background jobs after the listener closes.
    pub shutdown_timeout_secs: u64,
    /// Access-token secret and refresh-session lifetime.
    pub jwt: JwtConfig,
    /// Process-wide password salt.
    pub password_salt: String,
    pub audit: AuditConfig,
    /// Whether `/books` requires a bearer token (default: `true`).
    pub books_require_auth: bool,
    /// Interval of the expired-session purge; `0` disables it.
    pub session_cleanup_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `JWT_SECRET`                    | **required**            |
    /// | `REFRESH_TOKEN_TTL_DAYS`        | `30`                    |
    /// | `PASSWORD_SALT`                 | **required**            |
    /// | `AUDIT_URL`                     | unset (log only)        |
    /// | `AUDIT_TIMEOUT_SECS`            | `5`                     |
    /// | `BOOKS_REQUIRE_AUTH`            | `true`                  |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "PORT", 3000u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                if origin == "*" {
                    return Err(ConfigError::Invalid {
                        key: "CORS_ORIGINS",
                        value: origin.to_string(),
                        reason: "wildcard origin cannot be combined with credentials".into(),
                    });
                }
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = parse_or(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let jwt = JwtConfig {
            secret: required(&lookup, "JWT_SECRET")?,
            refresh_token_ttl_days: parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 30i64)?,
        };
        if jwt.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                key: "REFRESH_TOKEN_TTL_DAYS",
                value: jwt.refresh_token_ttl_days.to_string(),
                reason: "must be positive".into(),
            });
        }

        let password_salt = required(&lookup, "PASSWORD_SALT")?;

        let audit = AuditConfig {
            url: lookup("AUDIT_URL").filter(|u| !u.trim().is_empty()),
            timeout_secs: parse_or(&lookup, "AUDIT_TIMEOUT_SECS", 5u64)?,
        };

        let books_require_auth = match lookup("BOOKS_REQUIRE_AUTH") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "BOOKS_REQUIRE_AUTH",
                value: raw.clone(),
                reason: "expected true/false".into(),
            })?,
        };

        let session_cleanup_interval_secs =
            parse_or(&lookup, "SESSION_CLEANUP_INTERVAL_SECS", 3600u64)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            password_salt,
            audit,
            books_require_auth,
            session_cleanup_interval_secs,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    const SECRETS: [(&str, &str); 2] = [("JWT_SECRET", "s3cret"), ("PASSWORD_SALT", "salt")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = load(&SECRETS).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.cors_origins,
            vec![HeaderValue::from_static("http://localhost:5173")]
        );
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.jwt.refresh_token_ttl_days, 30);
        assert!(config.audit.url.is_none());
        assert_eq!(config.audit.timeout_secs, 5);
        assert!(config.books_require_auth);
        assert_eq!(config.session_cleanup_interval_secs, 3600);
    }

    #[test]
    fn missing_secrets_are_reported() {
        assert_matches!(
            load(&[("PASSWORD_SALT", "salt")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
        assert_matches!(
            load(&[("JWT_SECRET", "s")]),
            Err(ConfigError::Missing("PASSWORD_SALT"))
        );
        assert_matches!(
            load(&[("JWT_SECRET", ""), ("PASSWORD_SALT", "salt")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("REFRESH_TOKEN_TTL_DAYS", "7"),
            ("AUDIT_URL", "http://audit.local/log"),
            ("BOOKS_REQUIRE_AUTH", "false"),
            ("SESSION_CLEANUP_INTERVAL_SECS", "0"),
        ]);

        let config = load(&pairs).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.jwt.refresh_token_ttl_days, 7);
        assert_eq!(config.audit.url.as_deref(), Some("http://audit.local/log"));
        assert!(!config.books_require_auth);
        assert_eq!(config.session_cleanup_interval_secs, 0);
    }

    #[test]
    fn malformed_values_name_the_key() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("PORT", "eighty"));
        assert_matches!(load(&pairs), Err(ConfigError::Invalid { key: "PORT", .. }));

        let mut pairs = SECRETS.to_vec();
        pairs.push(("BOOKS_REQUIRE_AUTH", "maybe"));
        assert_matches!(
            load(&pairs),
            Err(ConfigError::Invalid {
                key: "BOOKS_REQUIRE_AUTH",
                ..
            })
        );

        let mut pairs = SECRETS.to_vec();
        pairs.push(("REFRESH_TOKEN_TTL_DAYS", "0"));
        assert_matches!(
            load(&pairs),
            Err(ConfigError::Invalid {
                key: "REFRESH_TOKEN_TTL_DAYS",
                ..
            })
        );
    }

    #[test]
    fn wildcard_cors_origin_is_rejected() {
        for origins in ["*", "https://a.example, *"] {
            let mut pairs = SECRETS.to_vec();
            pairs.push(("CORS_ORIGINS", origins));
            assert_matches!(
                load(&pairs),
                Err(ConfigError::Invalid {
                    key: "CORS_ORIGINS",
                    value,
                    ..
                }) if value == "*"
            );
        }
    }

    #[test]
    fn blank_audit_url_means_log_only() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("AUDIT_URL", "  "));
        assert!(load(&pairs).unwrap().audit.url.is_none());
    }
}
