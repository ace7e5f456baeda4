// Error handling module for the API
// Provides the shared error body and the error type used by the word resource

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

/// Main error type for the word resource and router-level failures
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Request could not be parsed (bad JSON, bad path or query)
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// A collection that must not be empty has no entries
    /// Maps to HTTP 404 Not Found
    EmptyCollection { resource: String },

    /// No route matched the request path
    /// Maps to HTTP 404 Not Found
    RouteNotFound(String),

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),
}

/// Consistent error response structure
///
/// `error` is a short human-readable summary suitable for display,
/// `message` explains what went wrong in more detail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Word not found")]
    pub error: String,

    #[schema(example = "No word found with the provided ID")]
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging level follows severity: error! for 500s, warn! for conflicts,
    /// debug! for expected client errors.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Validation failed", crate::validation::describe(errors))
                        .with_details(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                )
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);

                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Bad request", message.clone()),
                )
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(
                        format!("{} not found", resource),
                        format!("No {} found with id {}", resource.to_lowercase(), id),
                    ),
                )
            }
            ApiError::EmptyCollection { resource } => {
                debug!("Collection is empty: {}", resource);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(
                        format!("No {} found in database", resource),
                        format!("Please add some {} to the database first", resource),
                    ),
                )
            }
            ApiError::RouteNotFound(path) => {
                debug!("No route for {}", path);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not found", format!("Route {} not found", path)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);

                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Conflict", message.clone()),
                )
            }
            ApiError::DatabaseError(db_error) => {
                // Full driver error stays in the logs
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error", "A database error occurred"),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error", "An internal server error occurred"),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. }
            | ApiError::EmptyCollection { .. }
            | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(errors) => {
                write!(f, "validation failed: {}", crate::validation::describe(errors))
            }
            ApiError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ApiError::NotFound { resource, id } => write!(f, "{} {} not found", resource, id),
            ApiError::EmptyCollection { resource } => write!(f, "no {} available", resource),
            ApiError::RouteNotFound(path) => write!(f, "no route for {}", path),
            ApiError::Conflict { message } => write!(f, "conflict: {}", message),
            ApiError::DatabaseError(e) => write!(f, "database error: {}", e),
            ApiError::InternalError(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
