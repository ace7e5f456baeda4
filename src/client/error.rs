use thiserror::Error;

/// Failures surfaced by the client session layer
///
/// `Display` yields the message meant for the user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },
    /// The request never produced a usable response
    #[error("Network error: {0}")]
    Transport(String),
    /// The token slot could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
    /// No token is held, so there is nothing to revalidate
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The session was logged out while the request was in flight
    #[error("Session changed before the response arrived")]
    SessionChanged,
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error.to_string())
    }
}
