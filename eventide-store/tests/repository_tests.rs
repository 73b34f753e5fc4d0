use eventide_model::{DescribedEntity, EntitySchema, SchemaError, SchemaRegistry};
use eventide_store::{Repository, StoreError};
use eventide_types::{EntityKey, Event, HybridTimestamp, Record, TimeSelector};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;

fn schema() -> EntitySchema {
    EntitySchema::new("book").with_identifier("uuid").with_property("n")
}

fn book(uuid: &str, n: i64) -> Record {
    Record::new().with("uuid", uuid).with("n", n)
}

fn id(uuid: &str) -> Record {
    Record::new().with("uuid", uuid)
}

// ── End-to-end ───────────────────────────────────────────────────

#[test]
fn create_update_and_look_back() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    assert!(repo.find_all(TimeSelector::Latest).unwrap().is_empty());

    let created_at = repo.create(book("b1", 1)).unwrap();
    assert_eq!(
        repo.find_all(TimeSelector::Latest).unwrap().to_records(),
        vec![book("b1", 1)]
    );

    let updated_at = repo.update(book("b1", 42)).unwrap();
    assert!(updated_at > created_at);
    assert_eq!(
        repo.find_all(TimeSelector::Latest).unwrap().to_records(),
        vec![book("b1", 42)]
    );

    assert_eq!(
        repo.find_all(TimeSelector::At(created_at)).unwrap().to_records(),
        vec![book("b1", 1)]
    );
}

#[test]
fn each_mutation_emits_one_event() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(book("b1", 1)).unwrap();
    repo.update(book("b1", 2)).unwrap();
    repo.delete(id("b1")).unwrap();

    let ops: Vec<String> = repo
        .event_log()
        .iter()
        .map(|e| e.operation().to_string())
        .collect();
    assert_eq!(ops, vec!["create", "update", "delete"]);
    assert!(repo.event_log().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn duplicate_create_is_propagated() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(book("b1", 1)).unwrap();
    let err = repo.create(book("b1", 2)).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentifier { .. }));
    assert_eq!(repo.event_log().len(), 1);
    assert_eq!(
        repo.find_one(&id("b1"), TimeSelector::Latest).unwrap(),
        Some(book("b1", 1))
    );
}

#[test]
fn update_and_delete_of_missing_entity_are_propagated() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    assert!(matches!(
        repo.update(book("nope", 1)),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(repo.delete(id("nope")), Err(StoreError::NotFound { .. })));
    assert!(repo.event_log().is_empty());
}

#[test]
fn update_without_identifier_is_rejected() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    assert!(matches!(
        repo.update(Record::new().with("n", 1)),
        Err(StoreError::MissingIdentifier { .. })
    ));
}

#[test]
fn invalid_schema_refuses_to_start() {
    let two_ids = EntitySchema::new("book").with_identifier("a").with_identifier("b");
    assert!(matches!(
        Repository::new(&two_ids, Vec::new()),
        Err(StoreError::Schema(SchemaError::IdentifierCount { count: 2, .. }))
    ));
}

// ── Queries ──────────────────────────────────────────────────────

#[test]
fn find_one_returns_none_when_absent() {
    let repo = Repository::new(&schema(), Vec::new()).unwrap();
    assert_eq!(repo.find_one(&id("ghost"), TimeSelector::Latest).unwrap(), None);
}

#[test]
fn find_one_requires_identifier() {
    let repo = Repository::new(&schema(), Vec::new()).unwrap();
    assert!(matches!(
        repo.find_one(&Record::new(), TimeSelector::Latest),
        Err(StoreError::MissingIdentifier { .. })
    ));
}

#[test]
fn find_one_at_past_time_sees_deleted_entity() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    let created = repo.create(book("b1", 1)).unwrap();
    repo.delete(id("b1")).unwrap();

    assert_eq!(repo.find_one(&id("b1"), TimeSelector::Latest).unwrap(), None);
    assert_eq!(
        repo.find_one(&id("b1"), TimeSelector::At(created)).unwrap(),
        Some(book("b1", 1))
    );
    assert_eq!(
        repo.find_by_key(&EntityKey::new("b1"), TimeSelector::At(created)).unwrap(),
        Some(book("b1", 1))
    );
}

#[test]
fn returned_entities_are_copies() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(book("b1", 1)).unwrap();
    let mut found = repo.find_one(&id("b1"), TimeSelector::Latest).unwrap().unwrap();
    found.set("n", 1000);
    assert_eq!(
        repo.find_one(&id("b1"), TimeSelector::Latest).unwrap(),
        Some(book("b1", 1))
    );
}

// ── Seeding and persistence ──────────────────────────────────────

#[test]
fn seeded_repository_stamps_after_the_seed() {
    let future = HybridTimestamp::new(u64::MAX / 2, 0);
    let seed = vec![Event::create(future, book("b1", 1))];
    let mut repo = Repository::new(&schema(), seed).unwrap();
    let stamped = repo.update(book("b1", 2)).unwrap();
    assert!(stamped > future);
}

#[test]
fn rejected_mutations_do_not_advance_the_clock() {
    let wall = u64::MAX / 2;
    let seed = vec![Event::create(HybridTimestamp::new(wall, 0), book("b1", 1))];
    let mut repo = Repository::new(&schema(), seed).unwrap();

    assert!(repo.update(book("ghost", 1)).is_err());
    assert!(repo.create(book("b1", 9)).is_err());

    assert_eq!(repo.update(book("b1", 2)).unwrap(), HybridTimestamp::new(wall, 1));
}

#[test]
fn persist_hands_over_the_raw_log() {
    let mut repo = Repository::new(&schema(), Vec::new()).unwrap();
    repo.create(book("b1", 1)).unwrap();
    repo.update(book("b1", 2)).unwrap();

    let json = repo.persist_event_log(|events| serde_json::to_value(events)).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    assert_eq!(json[1]["payload"], json!({"op": "update", "data": {"uuid": "b1", "n": 2}}));

    let restored: Vec<Event> = serde_json::from_value(json).unwrap();
    let reloaded = Repository::new(&schema(), restored).unwrap();
    assert_eq!(
        reloaded.find_all(TimeSelector::Latest).unwrap().to_records(),
        vec![book("b1", 2)]
    );
}

// ── Schema sources ───────────────────────────────────────────────

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Book {
    uuid: String,
    title: String,
    pages: u32,
}

impl DescribedEntity for Book {
    fn schema() -> EntitySchema {
        EntitySchema::new("book")
            .with_identifier("uuid")
            .with_properties(["title", "pages"])
    }
}

#[test]
fn typed_entities_roundtrip() {
    let mut repo = Repository::for_entity::<Book>(Vec::new()).unwrap();
    let dune = Book {
        uuid: "b1".into(),
        title: "Dune".into(),
        pages: 412,
    };
    repo.create_typed(&dune).unwrap();
    repo.update_typed(&json!({"uuid": "b1", "pages": 500})).unwrap();

    let found: Option<Book> = repo.find_one_as(&id("b1"), TimeSelector::Latest).unwrap();
    assert_eq!(
        found,
        Some(Book {
            pages: 500,
            ..dune
        })
    );
    let all: Vec<Book> = repo.find_all_as(TimeSelector::Latest).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn typed_update_must_serialize_to_an_object() {
    let mut repo = Repository::for_entity::<Book>(Vec::new()).unwrap();
    assert!(matches!(
        repo.update_typed(&"not an object"),
        Err(StoreError::InvalidRecord(_))
    ));
}

#[test]
fn registry_backed_repository() {
    let registry: SchemaRegistry = [schema()].into_iter().collect();
    let mut repo = Repository::from_provider(&registry, "book", Vec::new()).unwrap();
    repo.create(book("b1", 1)).unwrap();
    assert_eq!(repo.schema().identifier_field(), "uuid");

    assert!(matches!(
        Repository::from_provider(&registry, "author", Vec::new()),
        Err(StoreError::Schema(SchemaError::UnknownType(_)))
    ));
}
