//! Unit tests for the in-memory CRUD store

use crate::domain::{EntityDefinition, FieldDef, Record, Value};
use crate::errors::DataError;
use crate::repositories::{CrudStore, InMemoryCrudStore};

fn accounts() -> EntityDefinition {
    EntityDefinition::new(
        "user",
        vec![
            FieldDef::integer("id").primary_key().auto_increment(),
            FieldDef::string("username").not_null(),
            FieldDef::string("password").not_null(),
            FieldDef::integer("status").not_null().default_value(0),
        ],
    )
    .unwrap()
}

fn aeishen() -> Record {
    Record::new().with("username", "Aeishen").with("password", "301070")
}

#[tokio::test]
async fn test_crud_scenario() {
    let store = InMemoryCrudStore::new(accounts());

    let created = store.create(aeishen()).await.unwrap();
    let id = created.id.unwrap();
    assert!(id > 0);

    let found = store.find_by_id(id).await.unwrap();
    assert_eq!(found.get("username"), Some(&Value::from("Aeishen")));
    assert_eq!(found.get("password"), Some(&Value::from("301070")));

    store
        .update(id, Record::new().with("username", "AeishenLin"))
        .await
        .unwrap();
    let found = store.find_by_id(id).await.unwrap();
    assert_eq!(found.get("username"), Some(&Value::from("AeishenLin")));
    assert_eq!(found.get("password"), Some(&Value::from("301070")));

    assert_eq!(store.delete(id).await.unwrap(), 1);
    let err = store.find_by_id(id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_then_find_matches_created() {
    let store = InMemoryCrudStore::new(accounts());

    let created = store.create(aeishen()).await.unwrap();
    let found = store.find_by_id(created.id.unwrap()).await.unwrap();

    assert_eq!(found, created);
    assert_eq!(found.get("status"), Some(&Value::Integer(0)));
}

#[tokio::test]
async fn test_create_requires_non_null_fields() {
    let store = InMemoryCrudStore::new(accounts());

    let err = store
        .create(Record::new().with("username", "May"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Validation { message, .. } if message.contains("password")));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_rejects_wrong_types_and_unknown_fields() {
    let store = InMemoryCrudStore::new(accounts());

    let wrong_type = aeishen().with("status", "active");
    assert!(matches!(
        store.create(wrong_type).await,
        Err(DataError::Validation { .. })
    ));

    let unknown = aeishen().with("email", "a@b.c");
    assert!(matches!(
        store.create(unknown).await,
        Err(DataError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_generated_ids_ignore_supplied_id() {
    let store = InMemoryCrudStore::new(accounts());

    let mut record = aeishen();
    record.id = Some(42);
    let first = store.create(record).await.unwrap();
    let second = store.create(aeishen()).await.unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
}

#[tokio::test]
async fn test_find_many_limit() {
    let store = InMemoryCrudStore::new(accounts());
    for _ in 0..5 {
        store.create(aeishen()).await.unwrap();
    }

    assert_eq!(store.find_many(0).await.unwrap().len(), 5);
    let two = store.find_many(2).await.unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(two[0].id, Some(1));
    assert_eq!(store.find_many(10).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let store = InMemoryCrudStore::new(accounts());

    let err = store
        .update(7, Record::new().with("username", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound { id: 7, .. }));
}

#[tokio::test]
async fn test_update_never_touches_primary_key() {
    let store = InMemoryCrudStore::new(accounts());
    let created = store.create(aeishen()).await.unwrap();

    let mut changes = Record::new().with("status", 1);
    changes.id = Some(99);
    let updated = store.update(created.id.unwrap(), changes).await.unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.get("status"), Some(&Value::Integer(1)));
    assert!(store.find_by_id(99).await.is_err());

    let key_as_field = Record::new().with("id", 5);
    assert!(store.update(1, key_as_field).await.is_err());
}

#[tokio::test]
async fn test_update_rejects_null_for_required_field() {
    let store = InMemoryCrudStore::new(accounts());
    let created = store.create(aeishen()).await.unwrap();

    let err = store
        .update(created.id.unwrap(), Record::new().with("username", Value::Null))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::Validation { .. }));
}

#[tokio::test]
async fn test_empty_update_returns_current_row() {
    let store = InMemoryCrudStore::new(accounts());
    let created = store.create(aeishen()).await.unwrap();

    let unchanged = store.update(created.id.unwrap(), Record::new()).await.unwrap();
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn test_delete_absent_row_affects_nothing() {
    let store = InMemoryCrudStore::new(accounts());
    assert_eq!(store.delete(3).await.unwrap(), 0);
}

#[tokio::test]
async fn test_largest_supplied_key_is_stored() {
    let def = EntityDefinition::new(
        "tag",
        vec![FieldDef::integer("id").primary_key(), FieldDef::string("name")],
    )
    .unwrap();
    let store = InMemoryCrudStore::new(def);

    let created = store
        .create(Record::with_id(i64::MAX).with("name", "last"))
        .await
        .unwrap();
    assert_eq!(created.id, Some(i64::MAX));

    store.create(Record::with_id(1).with("name", "first")).await.unwrap();

    let found = store.find_by_id(i64::MAX).await.unwrap();
    assert_eq!(found.get("name"), Some(&Value::from("last")));
    assert_eq!(store.len().await, 2);
}
