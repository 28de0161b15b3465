//! Text/tag filtering and stable sorting over a loaded note collection.
//!
//! # Invariants
//! - Text match is a case-insensitive substring test on title or content.
//! - Tag match is exact and case-sensitive.
//! - Filters compose with AND; an empty query returns input order untouched.
//! - Sorting is stable, so ties keep their incoming order.

use crate::model::note::Note;
use crate::model::settings::{SortBy, SortDirection};
use std::cmp::Ordering;

/// Current search input held by the note service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub search_text: String,
    pub tag_filter: Option<String>,
}

impl NoteQuery {
    pub fn new(search_text: impl Into<String>, tag_filter: Option<String>) -> Self {
        Self {
            search_text: search_text.into(),
            tag_filter,
        }
    }

    /// Applies this query to `notes`; see [`query`].
    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        query(notes, &self.search_text, self.tag_filter.as_deref())
    }

    /// Whether a single note passes this query.
    pub fn matches(&self, note: &Note) -> bool {
        let text_ok = self.search_text.trim().is_empty()
            || matches_text(note, &self.search_text.to_lowercase());
        text_ok
            && self
                .tag_filter
                .as_deref()
                .map_or(true, |tag| note.has_tag(tag))
    }
}

/// Returns the notes matching `search_text` and `tag_filter`.
///
/// Blank `search_text` disables text filtering; otherwise it is matched as
/// given, surrounding spaces included. No matches yields an empty vector.
pub fn query(all_notes: &[Note], search_text: &str, tag_filter: Option<&str>) -> Vec<Note> {
    let text_blank = search_text.trim().is_empty();
    if text_blank && tag_filter.is_none() {
        return all_notes.to_vec();
    }

    let needle = search_text.to_lowercase();
    all_notes
        .iter()
        .filter(|note| text_blank || matches_text(note, &needle))
        .filter(|note| tag_filter.map_or(true, |tag| note.has_tag(tag)))
        .cloned()
        .collect()
}

/// Stable in-place sort by the configured key and direction.
pub fn sort_notes(notes: &mut [Note], sort_by: SortBy, direction: SortDirection) {
    notes.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort_by);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn matches_text(note: &Note, lowercase_needle: &str) -> bool {
    note.title.to_lowercase().contains(lowercase_needle)
        || note.content.to_lowercase().contains(lowercase_needle)
}

fn compare_by(a: &Note, b: &Note, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortBy::CreatedAt => a.created_at.cmp(&b.created_at),
        SortBy::Title => a
            .title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title)),
    }
}
