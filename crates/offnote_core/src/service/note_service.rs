//! Note use-case service.
//!
//! # Responsibility
//! - Create, update, remove and tag notes.
//! - Keep the persisted tag registry equal to the union of all note tags.
//! - Hold the visible note list for the current query and sort.
//!
//! # Invariants
//! - Ids are unique; `created_at` never changes; `updated_at` never decreases.
//! - The visible list changes only after the store confirms a write.
//! - The tag registry is rebuilt from notes after every note mutation and is
//!   never patched incrementally.

use crate::model::note::{Note, NoteId, NotePatch};
use crate::model::settings::{SortBy, SortDirection};
use crate::search::query::{sort_notes, NoteQuery};
use crate::service::transfer::{self, TransferError};
use crate::store::{get_json, list_json, put_json, Namespace, RecordStore, StoreError};
use log::{info, warn};
use std::collections::{BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Millisecond clock used to stamp notes.
pub type Clock = fn() -> i64;

pub type NoteResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    NoteNotFound(NoteId),
    /// Tag input is blank after trimming.
    InvalidTag(String),
    /// Import payload is not a note collection.
    InvalidFormat(String),
    Storage(StoreError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::InvalidFormat(message) => write!(f, "invalid import document: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<TransferError> for NoteServiceError {
    fn from(value: TransferError) -> Self {
        match value {
            TransferError::InvalidFormat(message) => Self::InvalidFormat(message),
            TransferError::Storage(err) => Self::Storage(err),
            TransferError::Io(err) => Self::Storage(StoreError::Unavailable(err.to_string())),
        }
    }
}

/// Wall-clock epoch milliseconds.
pub fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Derives the tag registry from the notes that exist right now.
pub fn recompute_tags(notes: &[Note]) -> BTreeSet<String> {
    notes
        .iter()
        .flat_map(|note| note.tags.iter().cloned())
        .collect()
}

/// Picks `note_<now>`, or `note_<now>_<n>` with the smallest free `n`.
pub fn next_note_id(now: i64, taken: impl Fn(&str) -> bool) -> NoteId {
    let base = format!("note_{now}");
    if !taken(&base) {
        return base;
    }
    let mut seq = 1u64;
    loop {
        let candidate = format!("{base}_{seq}");
        if !taken(&candidate) {
            return candidate;
        }
        seq += 1;
    }
}

/// Trims tags, rejects blank ones and removes duplicates.
pub fn normalize_tags<I, T>(tags: I) -> NoteResult<BTreeSet<String>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| normalize_tag(tag.as_ref()))
        .collect()
}

fn normalize_tag(tag: &str) -> NoteResult<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(NoteServiceError::InvalidTag(tag.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Stateful note facade over a record store.
pub struct NoteService<S: RecordStore> {
    store: S,
    clock: Clock,
    query: NoteQuery,
    sort_by: SortBy,
    sort_direction: SortDirection,
    visible: Vec<Note>,
    tags: Vec<String>,
}

impl<S: RecordStore> NoteService<S> {
    /// Loads the collection with the wall clock and default sort.
    pub fn open(store: S) -> NoteResult<Self> {
        Self::open_with_clock(store, system_clock)
    }

    /// Loads the collection, reconciles the tag registry and builds the
    /// initial visible list (newest edits first).
    pub fn open_with_clock(store: S, clock: Clock) -> NoteResult<Self> {
        let mut service = Self {
            store,
            clock,
            query: NoteQuery::default(),
            sort_by: SortBy::UpdatedAt,
            sort_direction: SortDirection::Descending,
            visible: Vec::new(),
            tags: Vec::new(),
        };
        let all = service.all_notes()?;
        service.sync_tag_registry(&all)?;
        service.visible = service.sorted(all);
        info!(
            "event=notes_load module=note_service status=ok count={} tags={}",
            service.visible.len(),
            service.tags.len()
        );
        Ok(service)
    }

    /// Visible notes for the current query and sort.
    pub fn notes(&self) -> &[Note] {
        &self.visible
    }

    /// Tag registry snapshot, sorted.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn current_query(&self) -> &NoteQuery {
        &self.query
    }

    /// Registry tags containing `input`, case-insensitive, for tag entry
    /// completion.
    pub fn suggest_tags(&self, input: &str) -> Vec<String> {
        let needle = input.trim().to_lowercase();
        self.tags
            .iter()
            .filter(|tag| tag.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Every stored note, unordered.
    pub fn all_notes(&self) -> NoteResult<Vec<Note>> {
        Ok(list_json(&self.store, Namespace::Notes)?)
    }

    pub fn get_note(&self, id: &str) -> NoteResult<Option<Note>> {
        Ok(get_json(&self.store, Namespace::Notes, id)?)
    }

    /// Loads all notes and returns the sorted matches for `text`/`tag`.
    pub fn search(&self, text: &str, tag: Option<&str>) -> NoteResult<Vec<Note>> {
        let query = NoteQuery::new(text, tag.map(str::to_string));
        let all = self.all_notes()?;
        Ok(self.sorted(query.apply(&all)))
    }

    /// Re-runs the current query against the store.
    pub fn refresh(&mut self) -> NoteResult<&[Note]> {
        let all = self.all_notes()?;
        self.visible = self.sorted(self.query.apply(&all));
        Ok(&self.visible)
    }

    pub fn set_search_query(&mut self, text: impl Into<String>) -> NoteResult<&[Note]> {
        self.query.search_text = text.into();
        self.refresh()
    }

    pub fn set_tag_filter(&mut self, tag: Option<String>) -> NoteResult<&[Note]> {
        self.query.tag_filter = tag;
        self.refresh()
    }

    pub fn set_sort(&mut self, sort_by: SortBy, direction: SortDirection) -> NoteResult<&[Note]> {
        self.sort_by = sort_by;
        self.sort_direction = direction;
        self.refresh()
    }

    /// Creates and persists an empty note stamped with the current time.
    ///
    /// The new note is added to the visible list even when the current query
    /// would not match it, so the caller can start editing it.
    pub fn create_note(&mut self) -> NoteResult<Note> {
        let now = (self.clock)();
        let existing = self
            .store
            .list_entries(Namespace::Notes)?
            .into_iter()
            .map(|(key, _)| key)
            .collect::<HashSet<_>>();
        let note = Note::new(next_note_id(now, |id| existing.contains(id)), now);

        put_json(&self.store, Namespace::Notes, &note.id, &note)?;
        info!(
            "event=note_create module=note_service status=ok note_id={}",
            note.id
        );

        self.visible.push(note.clone());
        sort_notes(&mut self.visible, self.sort_by, self.sort_direction);
        Ok(note)
    }

    /// Merges `patch` onto the stored note and persists it.
    ///
    /// Once the note write succeeds the call succeeds; a failed registry
    /// rebuild is logged and repaired by the next mutation or open.
    ///
    /// # Errors
    /// - `NoteNotFound` when `id` is absent.
    /// - `InvalidTag` when a patched tag is blank.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> NoteResult<Note> {
        let current = self
            .get_note(id)?
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.to_string()))?;
        let new_tags = patch.tags.map(normalize_tags).transpose()?;

        let mut updated = current.clone();
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(content) = patch.content {
            updated.content = content;
        }
        if let Some(tags) = new_tags {
            updated.tags = tags;
        }
        updated.updated_at = (self.clock)().max(current.updated_at);

        put_json(&self.store, Namespace::Notes, &updated.id, &updated)?;
        let tags_changed = updated.tags != current.tags;
        info!(
            "event=note_update module=note_service status=ok note_id={} tags_changed={tags_changed}",
            updated.id
        );

        self.show_written(&updated);
        if tags_changed {
            self.reconcile_tag_registry("note_update");
        }
        Ok(updated)
    }

    /// Deletes a note; absent ids are a no-op.
    pub fn remove_note(&mut self, id: &str) -> NoteResult<()> {
        if self.get_note(id)?.is_none() {
            return Ok(());
        }

        self.store.delete(Namespace::Notes, id)?;
        info!("event=note_remove module=note_service status=ok note_id={id}");

        self.visible.retain(|note| note.id != id);
        self.reconcile_tag_registry("note_remove");
        Ok(())
    }

    /// Adds `tag` unless already present.
    pub fn add_tag_to_note(&mut self, note_id: &str, tag: &str) -> NoteResult<Note> {
        let tag = normalize_tag(tag)?;
        let note = self
            .get_note(note_id)?
            .ok_or_else(|| NoteServiceError::NoteNotFound(note_id.to_string()))?;
        if note.has_tag(&tag) {
            return Ok(note);
        }

        let mut tags = note.tags.into_iter().collect::<Vec<_>>();
        tags.push(tag);
        self.update_note(note_id, NotePatch::tags(tags))
    }

    /// Removes `tag` if present; returns `None` when the note is absent.
    pub fn remove_tag_from_note(&mut self, note_id: &str, tag: &str) -> NoteResult<Option<Note>> {
        let tag = tag.trim();
        let Some(note) = self.get_note(note_id)? else {
            return Ok(None);
        };
        if !note.has_tag(tag) {
            return Ok(Some(note));
        }

        let tags = note.tags.into_iter().filter(|current| current != tag);
        self.update_note(note_id, NotePatch::tags(tags)).map(Some)
    }

    /// Serializes every stored note into the export document.
    pub fn export_all(&self) -> NoteResult<String> {
        Ok(transfer::export_all(&self.store)?)
    }

    /// Upserts every note of `document` by id, then rebuilds the registry.
    ///
    /// The whole document is validated before the first write. A storage
    /// failure midway keeps the notes written so far; the registry is
    /// reconciled on the next mutation or open.
    pub fn import_all(&mut self, document: &str) -> NoteResult<usize> {
        let notes = transfer::parse_export(document)?;
        for (written, note) in notes.iter().enumerate() {
            if let Err(err) = put_json(&self.store, Namespace::Notes, &note.id, note) {
                warn!(
                    "event=notes_import module=note_service status=partial written={written} total={} error={err}",
                    notes.len()
                );
                return Err(err.into());
            }
        }

        let all = self.all_notes()?;
        self.sync_tag_registry(&all)?;
        self.visible = self.sorted(self.query.apply(&all));
        info!(
            "event=notes_import module=note_service status=ok count={}",
            notes.len()
        );
        Ok(notes.len())
    }

    /// Replaces `note` in the visible list, dropping it if the current
    /// query no longer matches.
    fn show_written(&mut self, note: &Note) {
        self.visible.retain(|current| current.id != note.id);
        if self.query.matches(note) {
            self.visible.push(note.clone());
        }
        sort_notes(&mut self.visible, self.sort_by, self.sort_direction);
    }

    /// Rebuilds the registry after a confirmed note write. Failures leave
    /// drift behind, so they are logged instead of returned.
    fn reconcile_tag_registry(&mut self, event: &str) {
        let result = match self.all_notes() {
            Ok(all) => self.sync_tag_registry(&all),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            warn!("event={event} module=note_service status=tags_stale error={err}");
        }
    }

    fn sorted(&self, mut notes: Vec<Note>) -> Vec<Note> {
        sort_notes(&mut notes, self.sort_by, self.sort_direction);
        notes
    }

    /// Makes the persisted tag namespace equal to `recompute_tags(notes)`.
    fn sync_tag_registry(&mut self, notes: &[Note]) -> NoteResult<()> {
        let desired = recompute_tags(notes);
        let stored = self
            .store
            .list_entries(Namespace::Tags)?
            .into_iter()
            .map(|(key, _)| key)
            .collect::<BTreeSet<_>>();

        for stale in stored.difference(&desired) {
            self.store.delete(Namespace::Tags, stale)?;
        }
        for missing in desired.difference(&stored) {
            put_json(&self.store, Namespace::Tags, missing, missing)?;
        }

        self.tags = desired.into_iter().collect();
        Ok(())
    }
}
