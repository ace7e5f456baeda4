// HTTP handlers for authentication endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::error::ErrorResponse;
use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, UserResponse},
    service::AuthService,
};

/// Body parse failures are validation errors, not 422s
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AuthError::ValidationError(rejection.body_text()))
}

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let request = json_body(payload)?;
    tracing::debug!("Registration attempt for {}", request.email);

    let response = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login a user
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AuthError> {
    let request = json_body(payload)?;
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Get current user information (protected endpoint)
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let profile = service.current_user(user.user_id).await?;
    Ok(Json(profile))
}

/// Update the current user's profile (protected endpoint)
/// PUT /api/auth/me
#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn update_me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AuthError> {
    let request = json_body(payload)?;
    let profile = service.update_profile(user.user_id, request).await?;
    Ok(Json(profile))
}
