use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

/// The key the token is persisted under.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Durable storage for the bearer token.
///
/// There is exactly one slot, keyed by [`AUTH_TOKEN_KEY`], and only the
/// [`SessionStore`][crate::SessionStore] reads or writes it. Implementations
/// don't need to be thread-safe beyond `Send` - all access is serialized by
/// the store.
pub trait TokenStore: Send {
    /// Read the persisted token, if any. An empty or whitespace-only value
    /// counts as absent.
    fn load(&self) -> Result<Option<String>, StorageError>;
    /// Persist `token`, replacing whatever was there.
    fn save(&mut self, token: &str) -> Result<(), StorageError>;
    /// Remove the persisted token. Clearing an empty slot is fine.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// The token slot couldn't be read or written.
#[derive(Debug, thiserror::Error)]
#[error("Unable to access the stored token")]
pub struct StorageError(
    #[source]
    #[from]
    std::io::Error,
);

/// A [`TokenStore`] backed by a single file named [`AUTH_TOKEN_KEY`] inside
/// `dir`, the closest filesystem analogue of the browser's localStorage
/// entry.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FileTokenStore {
            path: dir.as_ref().join(AUTH_TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            },
            Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("Persisting the token to {}", self.path.display());
        fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An in-memory [`TokenStore`]. Nothing survives the process; handy for
/// tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        MemoryTokenStore::default()
    }

    /// A store that already holds `token`, as if a previous run had
    /// persisted it.
    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryTokenStore {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &str) -> Result<(), StorageError> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.token = None;
        Ok(())
    }
}
