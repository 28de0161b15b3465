//! In-memory note filtering and ordering.
//!
//! Pure functions only; callers load notes from the store first.

pub mod query;
