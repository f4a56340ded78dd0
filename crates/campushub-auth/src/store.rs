//! File-backed credential storage.
//!
//! Credentials live in a single JSON file under the platform config
//! directory. Reads are forgiving: a missing or corrupt file simply means
//! no stored session.

use std::fs;
use std::path::PathBuf;

use campushub_core::{AppError, AppResult};
use tracing::debug;

use crate::credentials::Credentials;

const CREDENTIALS_FILE: &str = "credentials.json";

/// Loads and saves [`Credentials`] under a fixed directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    /// Creates a store rooted at the platform config directory.
    pub fn new() -> AppResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| AppError::storage("Could not determine the config directory"))?;
        Ok(Self {
            dir: base.join("campushub"),
        })
    }

    /// Creates a store rooted at an explicit directory. Used by tests.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// Persists credentials, creating the directory if needed.
    pub fn save(&self, credentials: &Credentials) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string_pretty(credentials)?;
        fs::write(self.path(), contents)?;
        debug!(path = %self.path().display(), "Saved credentials");
        Ok(())
    }

    /// Returns the stored credentials, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<Credentials> {
        let contents = fs::read_to_string(self.path()).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Removes the stored credentials. A missing file is not an error.
    pub fn clear(&self) -> AppResult<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a credentials file is present on disk.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }
}
