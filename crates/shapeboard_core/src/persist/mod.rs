//! Persistence boundary for store snapshots.
//!
//! # Responsibility
//! - Define the opaque blob-store contract the store writes through.
//! - Own the persisted record wire format and its lenient decoder.
//!
//! # Invariants
//! - Adapters move bytes only; they never interpret the record.
//! - Every adapter failure is reported as `PersistError`; the store decides
//!   whether it is fatal (it never is for load/save).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod record;
mod sqlite;

pub use memory::MemoryStorage;
pub use record::{decode_record, encode_record, DecodeError, LoadedState};
pub use sqlite::SqliteStorage;

/// Storage key the board state lives under.
pub const DEFAULT_STORAGE_KEY: &str = "shapes-app-state-v1";

pub type PersistResult<T> = Result<T, PersistError>;

/// Storage-level failure.
#[derive(Debug)]
pub enum PersistError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Backend refused the operation (quota, injected failure, closed handle).
    Unavailable(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Opaque device-local blob store.
///
/// `load` returns `Ok(None)` when nothing has been saved yet.
pub trait PersistenceAdapter {
    fn load(&self) -> PersistResult<Option<Vec<u8>>>;
    fn save(&self, bytes: &[u8]) -> PersistResult<()>;
}
