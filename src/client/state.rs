// Client session state and its reducer

use crate::auth::models::{AuthResponse, UserResponse};

/// Snapshot of the client's session
///
/// `is_authenticated` is true exactly when `user` holds a verified profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<UserResponse>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
}

impl SessionState {
    /// State before hydration: maybe a persisted token, no verified user yet
    pub fn initial(token: Option<String>) -> Self {
        Self {
            user: None,
            token,
            is_authenticated: false,
            loading: true,
        }
    }

    pub fn logged_out() -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            loading: false,
        }
    }
}

/// Transitions the session can go through
#[derive(Debug, Clone)]
pub enum SessionAction {
    LoginSuccess(AuthResponse),
    LoginFail,
    Logout,
    UserLoaded(UserResponse),
}

/// Pure transition function; persistence side effects live in the store
pub fn reduce(state: &SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::LoginSuccess(auth) => SessionState {
            user: Some(auth.user),
            token: Some(auth.token),
            is_authenticated: true,
            loading: false,
        },
        SessionAction::LoginFail | SessionAction::Logout => SessionState::logged_out(),
        SessionAction::UserLoaded(user) => SessionState {
            user: Some(user),
            token: state.token.clone(),
            is_authenticated: true,
            loading: false,
        },
    }
}
