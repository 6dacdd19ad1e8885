//! Credential inputs accepted by the sign-up and sign-in flows.
//!
//! Both structs derive [`Validate`]; handlers call `validate()` before the
//! input reaches the token service so malformed payloads surface as 400s.

use serde::Deserialize;
use validator::Validate;

/// Request body for `POST /auth/sign-up`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Request body for `POST /auth/sign-in`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInInput {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}
