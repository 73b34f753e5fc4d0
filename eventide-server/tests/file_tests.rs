use eventide_model::EntitySchema;
use eventide_server::{initial_event_log, load_event_log, load_schema, write_event_log};
use eventide_store::Repository;
use eventide_types::{Record, TimeSelector};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn schema() -> EntitySchema {
    EntitySchema::new("book").with_identifier("uuid").with_property("n")
}

#[test]
fn missing_log_loads_empty() {
    let dir = tempdir().unwrap();
    assert!(load_event_log(&dir.path().join("none.json")).unwrap().is_empty());
}

#[test]
fn written_log_reloads_into_same_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.json");

    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(Record::new().with("uuid", "b1").with("n", 1)).unwrap();
    repo.update(Record::new().with("uuid", "b1").with("n", 2)).unwrap();
    repo.persist_event_log(|events| write_event_log(&path, events))
        .unwrap();

    let events = load_event_log(&path).unwrap();
    assert_eq!(events.as_slice(), repo.event_log());

    let reloaded = Repository::new(&schema(), events).unwrap();
    assert_eq!(
        reloaded.find_all(TimeSelector::Latest).unwrap().to_records(),
        vec![Record::new().with("uuid", "b1").with("n", 2)]
    );
}

#[test]
fn restart_with_seed_and_persist_resumes_from_persisted_log() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    let persist = dir.path().join("events.json");

    let mut seeding = Repository::new(&schema(), Vec::new()).unwrap();
    seeding.create(Record::new().with("uuid", "b1").with("n", 1)).unwrap();
    write_event_log(&seed, seeding.event_log()).unwrap();

    // First run: no persisted log yet, so the seed is replayed.
    let log = initial_event_log(Some(&seed), Some(&persist)).unwrap();
    assert_eq!(log.len(), 1);
    let mut first = Repository::new(&schema(), log).unwrap();
    first.create(Record::new().with("uuid", "b2").with("n", 2)).unwrap();
    first
        .persist_event_log(|events| write_event_log(&persist, events))
        .unwrap();

    // Restart with the same flags.
    let log = initial_event_log(Some(&seed), Some(&persist)).unwrap();
    assert_eq!(log.len(), 2);
    let restarted = Repository::new(&schema(), log).unwrap();
    assert_eq!(
        restarted.find_all(TimeSelector::Latest).unwrap().to_records(),
        vec![
            Record::new().with("uuid", "b1").with("n", 1),
            Record::new().with("uuid", "b2").with("n", 2),
        ]
    );
}

#[test]
fn initial_log_falls_back_to_seed_then_empty() {
    let dir = tempdir().unwrap();
    let seed = dir.path().join("seed.json");
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(Record::new().with("uuid", "b1")).unwrap();
    write_event_log(&seed, repo.event_log()).unwrap();

    assert_eq!(initial_event_log(Some(&seed), None).unwrap().len(), 1);
    assert!(initial_event_log(None, Some(&dir.path().join("none.json"))).unwrap().is_empty());
    assert!(initial_event_log(None, None).unwrap().is_empty());
}

#[test]
fn corrupt_log_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = load_event_log(&path).unwrap_err();
    assert!(err.to_string().contains("decode"));
}

#[test]
fn schema_file_is_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("book.json");
    std::fs::write(
        &path,
        r#"{"entity_type": "book", "properties": [{"name": "uuid", "is_id": true}, {"name": "n"}]}"#,
    )
    .unwrap();
    assert_eq!(load_schema(&path).unwrap(), schema());
}
