use offnote_core::db::open_db_in_memory;
use offnote_core::{
    read_import_file, write_export_file, MemoryRecordStore, Namespace, Note, NotePatch,
    NoteService, NoteServiceError, RecordStore, SqliteRecordStore,
};
use std::sync::atomic::{AtomicI64, Ordering};

static TICKS: AtomicI64 = AtomicI64::new(1_700_000_000_000);

fn ticking_clock() -> i64 {
    TICKS.fetch_add(1, Ordering::SeqCst)
}

fn seed<S: RecordStore>(service: &mut NoteService<S>) -> Vec<Note> {
    let first = service.create_note().unwrap();
    let first = service
        .update_note(
            &first.id,
            NotePatch {
                title: Some("Meeting notes".to_string()),
                content: Some("line one\nline \"two\"".to_string()),
                tags: Some(vec!["work".to_string(), "q3".to_string()]),
            },
        )
        .unwrap();
    let second = service.create_note().unwrap();
    let second = service
        .update_note(&second.id, NotePatch::title("Groceries"))
        .unwrap();
    vec![first, second]
}

fn sorted_by_id(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by(|a, b| a.id.cmp(&b.id));
    notes
}

#[test]
fn export_is_a_json_array_with_exact_fields() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        NoteService::open_with_clock(SqliteRecordStore::new(&conn), ticking_clock).unwrap();
    seed(&mut service);

    let document = service.export_all().unwrap();
    let value: serde_json::Value = serde_json::from_str(&document).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        let mut keys = entry.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        assert_eq!(
            keys,
            vec!["content", "createdAt", "id", "tags", "title", "updatedAt"]
        );
        assert!(entry["createdAt"].is_i64());
        assert!(entry["tags"].is_array());
    }
}

#[test]
fn import_of_own_export_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        NoteService::open_with_clock(SqliteRecordStore::new(&conn), ticking_clock).unwrap();
    seed(&mut service);
    let before = sorted_by_id(service.all_notes().unwrap());

    let document = service.export_all().unwrap();
    let count = service.import_all(&document).unwrap();

    assert_eq!(count, before.len());
    assert_eq!(sorted_by_id(service.all_notes().unwrap()), before);
}

#[test]
fn import_into_empty_store_restores_notes_and_registry() {
    let source = MemoryRecordStore::new();
    let mut origin = NoteService::open_with_clock(&source, ticking_clock).unwrap();
    let seeded = seed(&mut origin);
    let document = origin.export_all().unwrap();

    let conn = open_db_in_memory().unwrap();
    let target = SqliteRecordStore::new(&conn);
    let mut service = NoteService::open_with_clock(target, ticking_clock).unwrap();
    assert_eq!(service.import_all(&document).unwrap(), 2);

    assert_eq!(
        sorted_by_id(service.all_notes().unwrap()),
        sorted_by_id(seeded)
    );
    assert_eq!(service.tags(), ["q3", "work"]);
    assert_eq!(target.list_entries(Namespace::Tags).unwrap().len(), 2);
    assert_eq!(service.notes().len(), 2);
}

#[test]
fn import_overwrites_by_id_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let mut service =
        NoteService::open_with_clock(SqliteRecordStore::new(&conn), ticking_clock).unwrap();
    let existing = service.create_note().unwrap();

    let document = format!(
        r#"[
            {{"id":"{}","title":"replaced","content":"","tags":["new"],"createdAt":1,"updatedAt":2}},
            {{"id":"imported_1","title":"fresh","content":"body","tags":[],"createdAt":3,"updatedAt":4}}
        ]"#,
        existing.id
    );

    let first = service.import_all(&document).unwrap();
    let after_first = sorted_by_id(service.all_notes().unwrap());
    let second = service.import_all(&document).unwrap();
    let after_second = sorted_by_id(service.all_notes().unwrap());

    assert_eq!(first, 2);
    assert_eq!(second, first);
    assert_eq!(after_first, after_second);
    assert_eq!(after_first.len(), 2);
    let replaced = service.get_note(&existing.id).unwrap().unwrap();
    assert_eq!(replaced.title, "replaced");
    assert_eq!(service.tags(), ["new"]);
}

#[test]
fn malformed_import_leaves_store_untouched() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::new(&conn);
    let mut service = NoteService::open_with_clock(store, ticking_clock).unwrap();
    seed(&mut service);
    let before = sorted_by_id(service.all_notes().unwrap());

    let documents = [
        r#"{"notes": []}"#,
        "[1, 2, 3]",
        r#"[{"id":"ok","createdAt":1,"updatedAt":1},{"title":"missing id"}]"#,
        r#"[{"id":"ok","tags":[""],"createdAt":1,"updatedAt":1}]"#,
        "",
    ];
    for document in documents {
        let err = service.import_all(document).unwrap_err();
        assert!(
            matches!(err, NoteServiceError::InvalidFormat(_)),
            "{document:?}"
        );
    }

    assert_eq!(sorted_by_id(service.all_notes().unwrap()), before);
    assert!(store.get(Namespace::Notes, "ok").unwrap().is_none());
}

#[test]
fn storage_failure_midway_keeps_written_notes() {
    let store = MemoryRecordStore::new();
    let mut service = NoteService::open_with_clock(&store, ticking_clock).unwrap();
    let document = r#"[
        {"id":"a","createdAt":1,"updatedAt":1},
        {"id":"b","createdAt":1,"updatedAt":1},
        {"id":"c","createdAt":1,"updatedAt":1}
    ]"#;

    store.fail_writes_after(1);
    let err = service.import_all(document).unwrap_err();
    assert!(matches!(err, NoteServiceError::Storage(_)));
    assert!(service.get_note("a").unwrap().is_some());
    assert!(service.get_note("b").unwrap().is_none());
}

#[test]
fn backup_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db_in_memory().unwrap();
    let mut service =
        NoteService::open_with_clock(SqliteRecordStore::new(&conn), ticking_clock).unwrap();
    seed(&mut service);

    let document = service.export_all().unwrap();
    let path = write_export_file(dir.path(), &document).unwrap();
    let file_name = path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("notes-backup-"));
    assert!(file_name.ends_with(".json"));

    assert_eq!(read_import_file(&path).unwrap(), document);
    assert!(read_import_file(&dir.path().join("missing.json")).is_err());
}
