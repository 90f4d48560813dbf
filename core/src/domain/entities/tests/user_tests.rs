//! Unit tests for user entity

use crate::domain::entities::{Entity, User, UserStatus};
use crate::domain::value_objects::{Record, Value};
use crate::errors::MappingError;

#[test]
fn test_new_user_creation() {
    let user = User::new("Aeishen", "301070");

    assert_eq!(user.id, None);
    assert_eq!(user.username, "Aeishen");
    assert_eq!(user.password, "301070");
    assert!(user.is_active());
    assert_eq!(user.create_time.timestamp_subsec_nanos(), 0);
}

#[test]
fn test_user_definition_matches_table() {
    let def = User::definition();

    assert_eq!(def.table(), "users");
    assert_eq!(
        def.column_names().collect::<Vec<_>>(),
        vec!["id", "username", "password", "status", "create_time"]
    );
    assert!(def.primary_key().unwrap().auto_increment);
}

#[test]
fn test_record_conversion_keeps_every_field() {
    let mut user = User::new("May", "111111");
    user.id = Some(2);

    let record = user.clone().into_record();
    assert_eq!(record.id, Some(2));
    assert_eq!(record.len(), 4);
    assert_eq!(record.get("status"), Some(&Value::Integer(0)));

    assert_eq!(User::from_record(record).unwrap(), user);
}

#[test]
fn test_mark_deleted() {
    let mut user = User::new("May", "111111");
    user.mark_deleted();

    assert!(!user.is_active());
    assert_eq!(user.status.code(), 1);
}

#[test]
fn test_from_record_reports_missing_field() {
    let record = Record::with_id(1).with("username", "May");
    let err = User::from_record(record).unwrap_err();

    assert!(matches!(err, MappingError::MissingField { .. }));
}

#[test]
fn test_from_record_rejects_unknown_status() {
    let mut record = User::new("May", "111111").into_record();
    record.set("status", 9);

    let err = User::from_record(record).unwrap_err();
    assert!(matches!(err, MappingError::InvalidValue { field, .. } if field == "status"));
}

#[test]
fn test_status_serialization() {
    assert_eq!(serde_json::to_string(&UserStatus::Active).unwrap(), "\"active\"");
    assert_eq!(UserStatus::from_code(1), Some(UserStatus::Deleted));
    assert_eq!(UserStatus::from_code(5), None);
}
