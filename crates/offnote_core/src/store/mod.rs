//! Durable key-value record store.
//!
//! # Responsibility
//! - Persist notes, the settings singleton and the tag registry in three
//!   logical namespaces of one local store.
//! - Translate backend failures into one storage-failure error kind.
//!
//! # Invariants
//! - `put` overwrites silently; `delete` of an absent key is a no-op.
//! - Values are JSON text; decoding failures surface as
//!   `StoreError::InvalidData`, never as skipped records.
//! - `list_entries` order is unspecified.

use crate::db::DbError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Logical partition inside the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Notes,
    Settings,
    Tags,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Notes, Self::Settings, Self::Tags];

    /// Stable storage name, also used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Settings => "settings",
            Self::Tags => "tags",
        }
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage failure: the mutation or read did not take effect.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Backend refused the operation (unavailable, full, access denied).
    Unavailable(String),
    InvalidData {
        namespace: Namespace,
        key: String,
        message: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "storage failure: {err}"),
            Self::Unavailable(reason) => write!(f, "storage failure: {reason}"),
            Self::InvalidData {
                namespace,
                key,
                message,
            } => write!(
                f,
                "storage failure: invalid record `{key}` in `{namespace}`: {message}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Unavailable(_) | Self::InvalidData { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Raw record persistence contract.
pub trait RecordStore {
    /// Inserts or overwrites `key` in `namespace`.
    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StoreResult<()>;
    fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>>;
    /// Removes `key` if present.
    fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<()>;
    /// Full scan of one namespace as `(key, value)` pairs.
    fn list_entries(&self, namespace: Namespace) -> StoreResult<Vec<(String, String)>>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn put(&self, namespace: Namespace, key: &str, value: &str) -> StoreResult<()> {
        (**self).put(namespace, key, value)
    }

    fn get(&self, namespace: Namespace, key: &str) -> StoreResult<Option<String>> {
        (**self).get(namespace, key)
    }

    fn delete(&self, namespace: Namespace, key: &str) -> StoreResult<()> {
        (**self).delete(namespace, key)
    }

    fn list_entries(&self, namespace: Namespace) -> StoreResult<Vec<(String, String)>> {
        (**self).list_entries(namespace)
    }
}

/// Serializes `value` and stores it under `key`.
pub fn put_json<S, T>(store: &S, namespace: Namespace, key: &str, value: &T) -> StoreResult<()>
where
    S: RecordStore + ?Sized,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(|err| StoreError::InvalidData {
        namespace,
        key: key.to_string(),
        message: err.to_string(),
    })?;
    store.put(namespace, key, &encoded)
}

/// Loads and decodes one record.
pub fn get_json<S, T>(store: &S, namespace: Namespace, key: &str) -> StoreResult<Option<T>>
where
    S: RecordStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .get(namespace, key)?
        .map(|raw| decode(namespace, key, &raw))
        .transpose()
}

/// Loads and decodes every record of one namespace.
pub fn list_json<S, T>(store: &S, namespace: Namespace) -> StoreResult<Vec<T>>
where
    S: RecordStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .list_entries(namespace)?
        .into_iter()
        .map(|(key, raw)| decode(namespace, &key, &raw))
        .collect()
}

fn decode<T: DeserializeOwned>(namespace: Namespace, key: &str, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|err| StoreError::InvalidData {
        namespace,
        key: key.to_string(),
        message: err.to_string(),
    })
}
