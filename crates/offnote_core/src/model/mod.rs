//! Record shapes persisted by the store and exchanged with callers.
//!
//! # Invariants
//! - Serialized field names match the export document (`camelCase`).
//! - Fields added later must carry a serde default so old exports still load.

pub mod note;
pub mod settings;
