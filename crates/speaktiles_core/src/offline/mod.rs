//! Offline support for the application shell.
//!
//! # Responsibility
//! - Keep one versioned cache generation of shell resources.
//! - Serve resource requests network-first, falling back to that generation.
//! - Manage generation hand-over between releases.
//!
//! # Invariants
//! - The generation name is always an explicit [`CacheVersion`] value.
//! - Partially installed generations are never used.
//!
//! [`CacheVersion`]: crate::config::CacheVersion

use crate::repo::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod controller;
pub mod request;
pub mod runtime;

/// Errors from cache lifecycle operations.
#[derive(Debug)]
pub enum OfflineError {
    /// A manifest path does not resolve against the scope URL.
    InvalidManifestPath(String),
    /// A manifest resource could not be fetched; the install was aborted.
    InstallFailed { url: String, reason: String },
    Storage(StorageError),
}

impl Display for OfflineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidManifestPath(path) => write!(f, "invalid manifest path `{path}`"),
            Self::InstallFailed { url, reason } => {
                write!(f, "install aborted: `{url}` could not be cached: {reason}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OfflineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for OfflineError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
