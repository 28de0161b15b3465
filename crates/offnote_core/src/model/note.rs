//! Note record and partial-update shape.
//!
//! # Invariants
//! - `id` and `created_at` never change after creation.
//! - `created_at <= updated_at`.
//! - `tags` holds no duplicates or blank entries; iteration order is not
//!   significant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque note identifier, e.g. `note_1700000000000`.
pub type NoteId = String;

/// User-authored text record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Exact-match labels; serialized as a JSON array of strings.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped on every create/update.
    pub updated_at: i64,
}

impl Note {
    /// Creates an empty note stamped with `now` for both timestamps.
    pub fn new(id: impl Into<NoteId>, now: i64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Checks record-level invariants, returning a description of the first
    /// violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("note id must not be blank".to_string());
        }
        if self.created_at > self.updated_at {
            return Err(format!(
                "note `{}` has createdAt {} after updatedAt {}",
                self.id, self.created_at, self.updated_at
            ));
        }
        if self.tags.iter().any(|tag| tag.trim().is_empty()) {
            return Err(format!("note `{}` has a blank tag", self.id));
        }
        Ok(())
    }
}

/// Partial fields accepted by note updates.
///
/// `None` leaves the stored value untouched. Identity and creation time are
/// deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn content(value: impl Into<String>) -> Self {
        Self {
            content: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn tags<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tags: Some(values.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NotePatch};

    #[test]
    fn new_note_starts_empty_with_equal_timestamps() {
        let note = Note::new("note_1", 42);
        assert!(note.title.is_empty());
        assert!(note.content.is_empty());
        assert!(note.tags.is_empty());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn serializes_with_export_field_names() {
        let mut note = Note::new("note_1", 10);
        note.tags.insert("work".to_string());
        let value = serde_json::to_value(&note).unwrap();
        let object = value.as_object().unwrap();
        let mut keys = object.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(
            keys,
            vec!["content", "createdAt", "id", "tags", "title", "updatedAt"]
        );
        assert_eq!(object["tags"], serde_json::json!(["work"]));
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let note: Note =
            serde_json::from_str(r#"{"id":"n","createdAt":1,"updatedAt":2}"#).unwrap();
        assert_eq!(note.title, "");
        assert!(note.tags.is_empty());
    }

    #[test]
    fn validate_rejects_reversed_timestamps_and_blank_id() {
        let mut note = Note::new("note_1", 5);
        note.created_at = 6;
        assert!(note.validate().unwrap_err().contains("createdAt"));

        let blank = Note::new("  ", 5);
        assert!(blank.validate().is_err());

        let mut blank_tag = Note::new("note_2", 5);
        blank_tag.tags.insert(" ".to_string());
        assert!(blank_tag
            .validate()
            .expect_err("blank tag must fail validation")
            .contains("blank tag"));
    }

    #[test]
    fn patch_constructors_touch_one_field() {
        let patch = NotePatch::tags(["a", "b"]);
        assert!(patch.title.is_none());
        assert_eq!(patch.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(NotePatch::default().is_empty());
    }
}
