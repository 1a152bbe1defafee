//! Storage contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL inside the persistence boundary.
//! - Expose small contracts that services and tests can substitute.
//!
//! # Invariants
//! - Writes either fully apply or return an error; no partial rows.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cache_repo;
pub mod kv_repo;

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable storage failure.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Value could not be encoded for storage.
    Serialize(String),
    /// Backend refused the write (quota, read-only medium).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(details) => write!(f, "failed to encode stored value: {details}"),
            Self::Unavailable(details) => write!(f, "storage unavailable: {details}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
