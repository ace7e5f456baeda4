// Authentication extractor for protected routes

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated user extractor for protected routes
///
/// Re-verifies the bearer token on every request; no session lookup.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.decode_claims(token).map_err(|e| {
            tracing::warn!("Rejected token for {}: {}", parts.uri.path(), e);
            e
        })?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidToken)?;

    if token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use proptest::prelude::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    // Helper to create test parts with Authorization header
    fn create_parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();

        let (parts, _) = req.into_parts();
        parts
    }

    // Helper to create test parts without Authorization header
    fn create_parts_without_auth() -> Parts {
        let req = Request::builder().uri("/").body(()).unwrap();

        let (parts, _) = req.into_parts();
        parts
    }

    fn test_state() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET))
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        let state = test_state();
        let user_id = Uuid::new_v4();
        let token = state.issue(user_id, "test@example.com", Role::User).unwrap();

        let mut parts = create_parts_with_auth(&format!("Bearer {}", token));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

        assert_eq!(user.user_id, user_id);
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let state = test_state();
        let expired = TokenService::with_ttl(SECRET, -500)
            .issue(Uuid::new_v4(), "test@example.com", Role::User)
            .unwrap();

        let mut parts = create_parts_with_auth(&format!("Bearer {}", expired));
        let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;

        assert!(matches!(result, Err(AuthError::ExpiredToken)));
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        let state = test_state();

        for value in [
            "Bearer invalid_token",
            "Bearer not.a.valid.jwt",
            "Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature",
        ] {
            let mut parts = create_parts_with_auth(value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &state).await;
            assert!(matches!(result, Err(AuthError::InvalidToken)));
        }
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let mut parts = create_parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &test_state()).await;

        assert!(matches!(result, Err(AuthError::MissingToken)));
    }

    #[test]
    fn test_invalid_bearer_format() {
        for value in ["InvalidFormat token", "token_without_bearer", "Basic dXNlcjpwYXNz", "Bearer ", ""] {
            let parts = create_parts_with_auth(value);
            assert!(matches!(bearer_token(&parts.headers), Err(AuthError::InvalidToken)));
        }
    }

    proptest! {
        #[test]
        fn prop_random_bearer_values_rejected(
            malformed in "[a-zA-Z0-9]{10,50}"
        ) {
            let state = test_state();
            let mut parts = create_parts_with_auth(&format!("Bearer {}", malformed));

            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(AuthenticatedUser::from_request_parts(&mut parts, &state));

            prop_assert!(result.is_err());
        }
    }
}
