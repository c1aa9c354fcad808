//! Key-value persistence slots.
//!
//! # Responsibility
//! - Define the storage medium contract consumed by repositories.
//! - Provide volatile (`MemorySlot`) and durable (`SqliteSlot`) media.
//!
//! # Invariants
//! - A slot stores opaque text values under string keys; it never parses them.
//! - `set` replaces the whole value for a key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemorySlot;
pub use sqlite::SqliteSlot;

pub type SlotResult<T> = Result<T, SlotError>;

/// Failure raised by a persistence medium.
#[derive(Debug)]
pub enum SlotError {
    /// Underlying database failure.
    Db(DbError),
    /// Write rejected because the medium would exceed its byte quota.
    QuotaExceeded { limit_bytes: usize, required_bytes: usize },
    /// Medium cannot be used at all (e.g. a poisoned or closed handle).
    Unavailable(String),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                limit_bytes,
                required_bytes,
            } => write!(
                f,
                "slot quota exceeded: {required_bytes} bytes required, limit is {limit_bytes}"
            ),
            Self::Unavailable(reason) => write!(f, "slot unavailable: {reason}"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key-value storage medium.
///
/// Repositories wrap slots behind an async contract, so implementations may
/// block briefly (local disk) but must not wait on remote peers.
pub trait KeyValueSlot: Send + Sync {
    /// Returns the stored value, or `None` when the key was never written.
    fn get(&self, key: &str) -> SlotResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> SlotResult<()>;
}

impl<S: KeyValueSlot + ?Sized> KeyValueSlot for Arc<S> {
    fn get(&self, key: &str) -> SlotResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        (**self).set(key, value)
    }
}
