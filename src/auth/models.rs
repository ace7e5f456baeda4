// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_not_blank;

/// Account role flag
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "A")]
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Registration request DTO
///
/// Missing fields deserialize as empty strings so they surface as
/// validation failures rather than parse failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "must be between 6 and 128 characters"))]
    #[schema(example = "secret1")]
    pub password: String,
    #[validate(
        length(max = 100, message = "must be at most 100 characters"),
        custom = "validate_not_blank"
    )]
    #[schema(example = "A")]
    pub name: String,
}

/// Login request DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "a@x.com")]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Profile update DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateProfileRequest {
    #[validate(
        length(max = 100, message = "must be at most 100 characters"),
        custom = "validate_not_blank"
    )]
    pub name: String,
}

/// Authentication response DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Canonical form used for storing and comparing emails
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_missing_fields_fail_validation() {
        let request: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_register_request_accepts_minimal_valid_payload() {
        let request = RegisterRequest {
            email: "a@x.com".into(),
            password: "secret1".into(),
            name: "A".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_blank_name_and_short_password() {
        let request = RegisterRequest {
            email: "a@x.com".into(),
            password: "12345".into(),
            name: "   ".into(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(!fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_user_response_excludes_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            name: "A".into(),
            role: Role::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }
}
