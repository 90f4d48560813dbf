//! Unit tests for the typed entity repository

use std::sync::Arc;

use crate::domain::{Entity, Record, User, UserStatus};
use crate::repositories::{EntityRepository, InMemoryCrudStore};

fn repository() -> EntityRepository<User> {
    let store = InMemoryCrudStore::new(User::definition().clone());
    EntityRepository::new(Arc::new(store))
}

#[tokio::test]
async fn test_create_and_find_user() {
    let users = repository();
    let user = User::new("Aeishen", "301070");

    let created = users.create(user.clone()).await.unwrap();
    assert_eq!(created.id, Some(1));

    let found = users.find_by_id(1).await.unwrap();
    assert_eq!(found.username, user.username);
    assert_eq!(found.create_time, user.create_time);
    assert!(found.is_active());
}

#[tokio::test]
async fn test_update_overwrites_all_fields() {
    let users = repository();
    let created = users.create(User::new("Aeishen", "301070")).await.unwrap();

    let mut changed = created.clone();
    changed.username = "AeishenLin".to_string();
    changed.mark_deleted();
    let updated = users.update(created.id.unwrap(), changed).await.unwrap();

    assert_eq!(updated.username, "AeishenLin");
    assert_eq!(updated.status, UserStatus::Deleted);
    assert_eq!(updated.password, "301070");
}

#[tokio::test]
async fn test_patch_changes_only_supplied_fields() {
    let users = repository();
    let created = users.create(User::new("Aeishen", "301070")).await.unwrap();

    let patched = users
        .patch(created.id.unwrap(), Record::new().with("password", "654321"))
        .await
        .unwrap();

    assert_eq!(patched.username, "Aeishen");
    assert_eq!(patched.password, "654321");
}

#[tokio::test]
async fn test_find_many_and_delete() {
    let users = repository();
    users.create(User::new("a", "1")).await.unwrap();
    users.create(User::new("b", "2")).await.unwrap();

    assert_eq!(users.find_many(0).await.unwrap().len(), 2);
    assert_eq!(users.delete(1).await.unwrap(), 1);

    let remaining = users.find_many(0).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].username, "b");
    assert!(users.find_by_id(1).await.unwrap_err().is_not_found());
}
