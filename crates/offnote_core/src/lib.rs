//! Local persistence and query core for the offline notes app.
//! Every note, settings and tag-registry invariant is enforced here.

pub mod db;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteId, NotePatch};
pub use model::settings::{Settings, SettingsPatch, SortBy, SortDirection, Theme};
pub use search::query::{query, sort_notes, NoteQuery};
pub use service::note_service::{
    recompute_tags, system_clock, Clock, NoteResult, NoteService, NoteServiceError,
};
pub use service::settings_service::{SettingsService, SETTINGS_KEY};
pub use service::transfer::{
    export_file_name, parse_export, read_import_file, write_export_file, TransferError,
};
pub use store::{
    MemoryRecordStore, Namespace, RecordStore, SqliteRecordStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
