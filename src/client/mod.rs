// Client-side session layer for consumers of the auth endpoints

pub mod api;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;

pub use api::{AuthApi, HttpAuthApi};
pub use error::ClientError;
pub use session::SessionStore;
pub use state::{reduce, SessionAction, SessionState};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage, TOKEN_SLOT};
