//! Use-case services on top of the record store.
//!
//! # Responsibility
//! - Own every note/settings mutation and the derived tag registry.
//! - Hand plain records to callers; callers never write the store directly.
//!
//! Services are constructed once by the caller and passed around by value or
//! reference; there is no global instance.

pub mod note_service;
pub mod settings_service;
pub mod transfer;
