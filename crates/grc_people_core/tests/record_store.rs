use grc_people_core::db::open_db_in_memory;
use grc_people_core::{
    EntityRef, OwningEntity, RecordStore, Relationship, RepoError, RoleSet, SqliteRecordStore,
};
use rusqlite::Connection;

fn request() -> OwningEntity {
    OwningEntity::new(EntityRef::new("Request", 10)).with_context(3)
}

fn roles(value: &str) -> RoleSet {
    RoleSet::parse(value)
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteRecordStore::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("people")));
}

#[test]
fn save_inserts_then_updates_attrs() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let alice = store.create_person("Alice", "alice@example.com").unwrap();

    let mut rel = Relationship::between(&alice, &request());
    rel.set_roles(&roles("Assignee"));
    let saved = store.save(&rel).unwrap();
    let id = saved.id.unwrap();

    let mut loaded = store.find_relationship(id).unwrap().unwrap();
    assert_eq!(loaded.assignee_type(), Some("Assignee"));
    assert_eq!(loaded.context_id, Some(3));
    assert_eq!(loaded.person_id(), Some(alice.id));

    loaded.set_roles(&roles("Assignee,Verifier"));
    store.save(&loaded).unwrap();
    let refreshed = store.refresh(&saved).unwrap();
    assert_eq!(refreshed.assignee_type(), Some("Assignee,Verifier"));
}

#[test]
fn save_rejects_empty_assignee_type() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let alice = store.create_person("Alice", "alice@example.com").unwrap();

    let mut rel = Relationship::between(&alice, &request());
    rel.set_roles(&RoleSet::default());
    let err = store.save(&rel).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn destroy_removes_relationship_and_attrs() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let alice = store.create_person("Alice", "alice@example.com").unwrap();
    let mut rel = Relationship::between(&alice, &request());
    rel.set_roles(&roles("Verifier"));
    let saved = store.save(&rel).unwrap();

    store.destroy(&saved).unwrap();
    assert!(store.find_relationship(saved.id.unwrap()).unwrap().is_none());
    let orphaned: i64 = conn
        .query_row("SELECT COUNT(*) FROM relationship_attrs;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned, 0);

    let err = store.refresh(&saved).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    let err = store.destroy(&saved).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn relationships_are_found_in_either_direction() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let alice = store.create_person("Alice", "alice@example.com").unwrap();
    let owner = request();

    let mut forward = Relationship::between(&alice, &owner);
    forward.set_roles(&roles("Assignee"));
    let forward = store.save(&forward).unwrap();

    let mut backward = Relationship::between(&alice, &owner);
    std::mem::swap(&mut backward.source, &mut backward.destination);
    backward.set_roles(&roles("Verifier"));
    let backward = store.save(&backward).unwrap();

    let ids = store
        .relationship_ids_between(alice.id, &owner.entity)
        .unwrap();
    assert_eq!(ids, vec![forward.id.unwrap(), backward.id.unwrap()]);
    assert_eq!(
        store.get_relationship(alice.id, &owner.entity).unwrap(),
        Some(forward)
    );
    assert!(store
        .get_relationship(alice.id, &EntityRef::new("Request", 11))
        .unwrap()
        .is_none());
}

#[test]
fn mapping_filters_by_role_and_deduplicates() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let owner = request();
    let alice = store.create_person("Alice", "alice@example.com").unwrap();
    let bob = store.create_person("Bob", "bob@example.com").unwrap();
    let carol = store.create_person("Carol", "carol@example.com").unwrap();

    for (person, value) in [
        (&alice, "assignee,Verifier"),
        (&alice, "Assignee"),
        (&bob, "Verifier"),
        (&carol, "Assignee"),
    ] {
        let mut rel = Relationship::between(person, &owner);
        rel.set_roles(&roles(value));
        store.save(&rel).unwrap();
    }

    let assignees: Vec<i64> = store
        .get_mapping(&owner.entity, "related_assignees")
        .unwrap()
        .into_iter()
        .map(|entry| entry.instance.id)
        .collect();
    assert_eq!(assignees, vec![alice.id, carol.id]);

    let verifiers = store.get_mapping(&owner.entity, "related_verifiers").unwrap();
    assert_eq!(verifiers.len(), 2);

    let everyone = store.get_mapping(&owner.entity, "related_people").unwrap();
    assert_eq!(everyone.len(), 3);

    assert!(store
        .get_mapping(&owner.entity, "owners")
        .unwrap()
        .is_empty());
}

#[test]
fn find_person_returns_none_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let alice = store.create_person(" Alice ", "alice@example.com").unwrap();

    assert_eq!(store.find_person(alice.id).unwrap(), Some(alice));
    assert_eq!(store.find_person(999).unwrap(), None);
}
