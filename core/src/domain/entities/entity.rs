//! Statically typed entities on top of [`Record`].

use chrono::{DateTime, Utc};

use crate::domain::definition::{EntityDefinition, FieldType};
use crate::domain::value_objects::{Record, Value};
use crate::errors::MappingError;

/// An application type with a statically declared storage mapping
///
/// Implementations convert to and from the storage-neutral [`Record`];
/// the definition is built once and shared by every layer.
pub trait Entity: Sized + Send + Sync + 'static {
    fn definition() -> &'static EntityDefinition;

    fn id(&self) -> Option<i64>;

    /// All fields, so a write overwrites the whole row
    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Result<Self, MappingError>;
}

fn require(record: &Record, def: &EntityDefinition, field: &str) -> Result<Value, MappingError> {
    record.get(field).cloned().ok_or_else(|| MappingError::MissingField {
        entity: def.name().to_string(),
        field: field.to_string(),
    })
}

fn mismatch(def: &EntityDefinition, field: &str, expected: FieldType, actual: &Value) -> MappingError {
    MappingError::TypeMismatch {
        entity: def.name().to_string(),
        field: field.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

/// Read a non-null string field
pub fn string_field(record: &Record, def: &EntityDefinition, field: &str) -> Result<String, MappingError> {
    match require(record, def, field)? {
        Value::String(v) => Ok(v),
        other => Err(mismatch(def, field, FieldType::String, &other)),
    }
}

/// Read a non-null integer field
pub fn integer_field(record: &Record, def: &EntityDefinition, field: &str) -> Result<i64, MappingError> {
    match require(record, def, field)? {
        Value::Integer(v) => Ok(v),
        other => Err(mismatch(def, field, FieldType::Integer, &other)),
    }
}

/// Read a non-null timestamp field
pub fn timestamp_field(
    record: &Record,
    def: &EntityDefinition,
    field: &str,
) -> Result<DateTime<Utc>, MappingError> {
    match require(record, def, field)? {
        Value::Timestamp(v) => Ok(v),
        other => Err(mismatch(def, field, FieldType::Timestamp, &other)),
    }
}
