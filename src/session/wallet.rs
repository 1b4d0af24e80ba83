//! Wallet credential persistence for session bootstrap.
//!
//! The session provider hands back an opaque credential blob when a
//! conversation is bound; it is written to a well-known path verbatim and
//! offered back to the provider on the next bootstrap. The blob's contents
//! are never inspected here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while binding the agent session.
///
/// All of these are fatal for startup: the loop never reaches its running
/// state when bootstrap fails.
#[derive(Debug, Error)]
pub enum SessionInitError {
    /// Existing wallet material could not be read (absence is not an error).
    #[error("failed to read wallet data from {}: {source}", path.display())]
    WalletRead {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// Refreshed wallet material could not be written back.
    #[error("failed to persist wallet data to {}: {source}", path.display())]
    WalletPersist {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },

    /// The session provider refused to establish a conversation.
    #[error("session provider rejected bootstrap: {0}")]
    Provider(String),
}

/// Result type for session bootstrap operations.
pub type SessionInitResult<T> = Result<T, SessionInitError>;

/// Load/save of the opaque wallet blob at a well-known path.
#[derive(Debug, Clone)]
pub struct WalletStore {
    path: PathBuf,
}

impl WalletStore {
    /// Create a store for the given path. Nothing is touched until
    /// [`load`](Self::load) or [`save`](Self::save) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the blob is persisted at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read previously persisted wallet material.
    ///
    /// A missing file yields `Ok(None)`; any other IO failure is fatal.
    pub fn load(&self) -> SessionInitResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SessionInitError::WalletRead {
                path: self.path.clone(),
                source: err,
            }),
        }
    }

    /// Persist the provider's exported blob verbatim.
    pub fn save(&self, blob: &str) -> SessionInitResult<()> {
        fs::write(&self.path, blob).map_err(|err| SessionInitError::WalletPersist {
            path: self.path.clone(),
            source: err,
        })
    }
}
