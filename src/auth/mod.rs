// Authentication module
// Provides JWT-based authentication with registration, login and profile endpoints

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::{AuthError, AuthErrorKind};
pub use handlers::{login_handler, me_handler, register_handler, update_me_handler};
pub use middleware::AuthenticatedUser;
pub use models::{
    AuthResponse, LoginRequest, RegisterRequest, Role, UpdateProfileRequest, User, UserResponse,
};
pub use repository::{InMemoryUserRepository, UserRepository, UserStore};
pub use service::AuthService;
pub use token::TokenService;
