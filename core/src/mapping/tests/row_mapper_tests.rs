//! Unit tests for the row mapper

use chrono::{TimeZone, Utc};

use crate::domain::{Entity, EntityDefinition, FieldDef, Record, User, Value};
use crate::errors::MappingError;
use crate::mapping::RowMapper;

fn accounts() -> EntityDefinition {
    EntityDefinition::new(
        "accounts",
        vec![
            FieldDef::integer("id").primary_key().auto_increment(),
            FieldDef::string("username").not_null(),
            FieldDef::string("password").not_null(),
            FieldDef::string("nickname"),
            FieldDef::integer("status").not_null().default_value(0),
        ],
    )
    .unwrap()
}

fn stored() -> Record {
    Record::with_id(1)
        .with("username", "Aeishen")
        .with("password", "301070")
        .with("nickname", Value::Null)
        .with("status", 0)
}

#[test]
fn test_round_trip_preserves_every_field() {
    let def = accounts();
    let record = stored();

    let row = RowMapper::encode(&record, &def).unwrap();
    assert_eq!(row[0], Value::Integer(1));
    assert_eq!(row[1], Value::from("Aeishen"));

    assert_eq!(RowMapper::decode(&def, row).unwrap(), record);
}

#[test]
fn test_user_round_trip_through_row() {
    let mut user = User::new("Aeishen", "301070");
    user.id = Some(10);
    user.create_time = Utc.with_ymd_and_hms(2020, 5, 1, 8, 30, 0).unwrap();

    let def = User::definition();
    let row = RowMapper::encode(&user.clone().into_record(), def).unwrap();
    let decoded = User::from_record(RowMapper::decode(def, row).unwrap()).unwrap();

    assert_eq!(decoded, user);
}

#[test]
fn test_decode_rejects_wrong_column_count() {
    let err = RowMapper::decode(&accounts(), vec![Value::Integer(1), Value::from("x")]).unwrap_err();
    assert!(matches!(
        err,
        MappingError::ColumnCount { expected: 5, actual: 2, .. }
    ));
}

#[test]
fn test_decode_rejects_incompatible_type() {
    let row = vec![
        Value::Integer(1),
        Value::Integer(99),
        Value::from("301070"),
        Value::Null,
        Value::Integer(0),
    ];
    let err = RowMapper::decode(&accounts(), row).unwrap_err();
    assert!(matches!(err, MappingError::TypeMismatch { field, .. } if field == "username"));
}

#[test]
fn test_decode_rejects_null_in_not_null_column() {
    let row = vec![
        Value::Integer(1),
        Value::Null,
        Value::from("301070"),
        Value::Null,
        Value::Integer(0),
    ];
    assert!(RowMapper::decode(&accounts(), row).is_err());
}

#[test]
fn test_encode_fields_follows_requested_order() {
    let def = accounts();
    let fields = [def.field("password").unwrap(), def.field("username").unwrap()];

    let row = RowMapper::encode_fields(&stored(), &def, fields).unwrap();
    assert_eq!(row, vec![Value::from("301070"), Value::from("Aeishen")]);
}

#[test]
fn test_encode_rejects_undeclared_field() {
    let record = stored().with("email", "a@b.c");
    let err = RowMapper::encode(&record, &accounts()).unwrap_err();
    assert!(matches!(err, MappingError::UnknownField { field, .. } if field == "email"));
}

#[test]
fn test_encode_rejects_primary_key_as_field() {
    let record = Record::new().with("id", 5);
    assert!(RowMapper::check_fields(&record, &accounts()).is_err());
}

#[test]
fn test_encode_without_id_leaves_generated_key_null() {
    let mut record = stored();
    record.id = None;

    let row = RowMapper::encode(&record, &accounts()).unwrap();
    assert_eq!(row[0], Value::Null);
}

#[test]
fn test_complete_fills_defaults_and_nulls() {
    let mut record = Record::new().with("username", "May").with("password", "111111");
    RowMapper::complete(&mut record, &accounts());

    assert_eq!(record.get("status"), Some(&Value::Integer(0)));
    assert_eq!(record.get("nickname"), Some(&Value::Null));
    assert!(!record.contains("id"));
}
