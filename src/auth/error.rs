// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::error::ErrorResponse;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Missing authentication token")]
    MissingToken,
    /// Token verified but its subject no longer exists in the store
    #[error("User not found")]
    UserNotFound,
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
}

/// Caller-facing classification of an [`AuthError`]
///
/// Several internal variants collapse into one kind so responses never reveal
/// which check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Validation,
    DuplicateEmail,
    InvalidCredentials,
    Unauthorized,
    Internal,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::ValidationError(_) => AuthErrorKind::Validation,
            AuthError::EmailAlreadyExists => AuthErrorKind::DuplicateEmail,
            AuthError::InvalidCredentials => AuthErrorKind::InvalidCredentials,
            AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken
            | AuthError::UserNotFound => AuthErrorKind::Unauthorized,
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => AuthErrorKind::Internal,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            AuthErrorKind::Validation => StatusCode::BAD_REQUEST,
            AuthErrorKind::DuplicateEmail => StatusCode::CONFLICT,
            AuthErrorKind::InvalidCredentials | AuthErrorKind::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AuthErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Summary and detail that are safe to send to clients
    pub fn public_message(&self) -> (&'static str, String) {
        match self {
            AuthError::ValidationError(msg) => ("Validation failed", msg.clone()),
            AuthError::InvalidCredentials => (
                "Invalid email or password",
                "The email or password you entered is incorrect".to_string(),
            ),
            AuthError::InvalidToken | AuthError::UserNotFound => (
                "Unauthorized",
                "Authentication token is invalid".to_string(),
            ),
            AuthError::ExpiredToken => (
                "Unauthorized",
                "Authentication token has expired".to_string(),
            ),
            AuthError::MissingToken => (
                "Unauthorized",
                "Missing authentication token".to_string(),
            ),
            AuthError::EmailAlreadyExists => (
                "Email already exists",
                "An account with this email is already registered".to_string(),
            ),
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => (
                "Internal server error",
                "An internal server error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::ValidationError(msg) => debug!("Auth validation error: {}", msg),
            AuthError::InvalidCredentials => debug!("Login rejected: invalid credentials"),
            AuthError::InvalidToken => warn!("Invalid token attempt"),
            AuthError::ExpiredToken => warn!("Expired token attempt"),
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::UserNotFound => warn!("Token subject no longer exists"),
            AuthError::EmailAlreadyExists => debug!("Registration rejected: email already exists"),
            AuthError::DatabaseError(msg) => error!("Database error in auth: {}", msg),
            AuthError::PasswordHashError(msg) => error!("Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => error!("Token generation error: {}", msg),
        }

        let (summary, message) = self.public_message();
        (self.status_code(), Json(ErrorResponse::new(summary, message))).into_response()
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(crate::validation::describe(&errors))
    }
}
