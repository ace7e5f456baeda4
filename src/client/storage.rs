// Persistent slot for the client's session token

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::client::error::ClientError;

/// Name of the single slot the token lives under
pub const TOKEN_SLOT: &str = "token";

/// Synchronous key-less slot holding at most one token
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, ClientError>;
    fn store(&self, token: &str) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// Token slot that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already persisted
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, ClientError> {
        self.token
            .lock()
            .map_err(|_| ClientError::Storage("token slot lock poisoned".to_string()))
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.slot()?.clone())
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Token slot persisted as a file named [`TOKEN_SLOT`] inside a directory
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_SLOT),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        fs::write(&self.path, token).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}
