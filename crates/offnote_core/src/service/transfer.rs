//! Export/import of the whole note collection.
//!
//! # Responsibility
//! - Encode every stored note as one JSON array document.
//! - Decode and validate a supplied document before anything is written.
//! - Name, write and read backup files on disk.
//!
//! # Invariants
//! - Export output is ordered by note id.
//! - A document that fails validation produces no writes.

use crate::model::note::Note;
use crate::store::{list_json, Namespace, RecordStore, StoreError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum TransferError {
    InvalidFormat(String),
    Storage(StoreError),
    Io(std::io::Error),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(message) => write!(f, "invalid import document: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "backup file error: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidFormat(_) => None,
            Self::Storage(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<StoreError> for TransferError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for TransferError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Serializes every note in `store`.
pub fn export_all<S: RecordStore + ?Sized>(store: &S) -> Result<String, TransferError> {
    let mut notes: Vec<Note> = list_json(store, Namespace::Notes)?;
    notes.sort_by(|a, b| a.id.cmp(&b.id));
    serde_json::to_string(&notes).map_err(|err| TransferError::InvalidFormat(err.to_string()))
}

/// Parses an export document into validated notes.
///
/// Fails with `InvalidFormat` for non-arrays, wrong field types, missing
/// `id`/`createdAt`/`updatedAt`, blank ids or tags, or `createdAt > updatedAt`.
pub fn parse_export(document: &str) -> Result<Vec<Note>, TransferError> {
    let notes: Vec<Note> = serde_json::from_str(document)
        .map_err(|err| TransferError::InvalidFormat(err.to_string()))?;
    for (index, note) in notes.iter().enumerate() {
        note.validate()
            .map_err(|message| TransferError::InvalidFormat(format!("entry {index}: {message}")))?;
    }
    Ok(notes)
}

/// Backup file name for `date`, e.g. `notes-backup-2024-05-01.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("notes-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Writes `document` into `dir` under today's backup name.
pub fn write_export_file(dir: &Path, document: &str) -> Result<PathBuf, TransferError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(chrono::Local::now().date_naive()));
    std::fs::write(&path, document)?;
    Ok(path)
}

/// Reads a backup file as raw text; parsing is left to [`parse_export`].
pub fn read_import_file(path: &Path) -> Result<String, TransferError> {
    Ok(std::fs::read_to_string(path)?)
}
