// Authentication service - business logic layer

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        normalize_email, AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User,
        UserResponse,
    },
    password::PasswordService,
    repository::UserStore,
    token::TokenService,
};

/// Authentication service coordinating the credential store and token service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Register a new user and issue a session token
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        let name = request.name.trim().to_string();

        let password_hash = PasswordService::hash_password_async(request.password).await?;
        let user = self
            .users
            .create_user(&request.email, &password_hash, &name)
            .await?;

        tracing::info!("Registered user {}", user.id);
        self.session_for(user)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                PasswordService::dummy_verify(request.password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches =
            PasswordService::verify_password_async(request.password, user.password_hash.clone())
                .await?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!("User {} logged in", user.id);
        self.session_for(user)
    }

    /// Load the profile behind a verified token
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AuthError::UserNotFound)
    }

    /// Update the caller's own profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        request.validate()?;

        let user = self
            .users
            .update_name(user_id, request.name.trim())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        tracing::info!("Updated profile for user {}", user.id);
        Ok(user.into())
    }

    fn session_for(&self, user: User) -> Result<AuthResponse, AuthError> {
        let token = self.tokens.issue(user.id, &user.email, user.role)?;
        Ok(AuthResponse {
            user: user.into(),
            token,
        })
    }
}
