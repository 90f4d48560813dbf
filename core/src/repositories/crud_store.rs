//! CRUD facade trait defining the interface for entity persistence.
//!
//! A store is bound to one [`EntityDefinition`] and speaks [`Record`]s, so
//! the same implementation serves every entity type. Typed access goes
//! through [`EntityRepository`](super::EntityRepository).

use async_trait::async_trait;

use crate::domain::{EntityDefinition, Record};
use crate::errors::{DataError, DataResult};
use crate::mapping::RowMapper;

/// Entity-level create/read/update/delete operations
///
/// Every call is one autonomous unit of work: implementations backed by a
/// connection pool acquire a connection per call and give it back on every
/// exit path. There is no cross-call atomicity, so two concurrent updates
/// of the same id race and the last write wins.
#[async_trait]
pub trait CrudStore: Send + Sync {
    /// The definition every record of this store conforms to
    fn definition(&self) -> &EntityDefinition;

    /// Persist a new record
    ///
    /// # Returns
    /// * `Ok(Record)` - The stored record with its id, omitted fields
    ///   filled with their defaults (or NULL)
    /// * `Err(DataError::Validation)` - A required field is missing or a
    ///   value does not fit its field
    async fn create(&self, record: Record) -> DataResult<Record>;

    /// Find a record by primary key
    ///
    /// # Returns
    /// * `Ok(Record)` - The stored row
    /// * `Err(DataError::NotFound)` - No row has this id
    async fn find_by_id(&self, id: i64) -> DataResult<Record>;

    /// List records in primary key order, at most `limit` of them (0 = all)
    async fn find_many(&self, limit: u64) -> DataResult<Vec<Record>>;

    /// Overwrite the supplied fields of an existing record
    ///
    /// Reads before writing: fails with `NotFound` when no row has `id`.
    /// Fields absent from `changes` keep their stored value and the
    /// primary key is never written. An empty change set returns the
    /// current row untouched.
    async fn update(&self, id: i64, changes: Record) -> DataResult<Record>;

    /// Delete a record, returning the number of rows removed (0 if absent)
    async fn delete(&self, id: i64) -> DataResult<u64>;
}

/// Check a record about to be created
///
/// The key of an auto-increment entity is generated, so a caller-supplied
/// id is only accepted (and then required) when the key is not generated.
pub fn validate_create(def: &EntityDefinition, record: &Record) -> DataResult<()> {
    validate_changes(def, record)?;

    for field in def.updatable_fields() {
        if field.is_required() && !record.contains(&field.name) {
            return Err(DataError::validation(
                def.name(),
                format!("field '{}' is required", field.name),
            ));
        }
    }

    match def.primary_key() {
        Some(pk) if !pk.auto_increment && record.id.is_none() => Err(DataError::validation(
            def.name(),
            format!("field '{}' is required", pk.name),
        )),
        _ => Ok(()),
    }
}

/// Check that every supplied field is declared, writable and type-correct
pub fn validate_changes(def: &EntityDefinition, record: &Record) -> DataResult<()> {
    RowMapper::check_fields(record, def)
        .map_err(|e| DataError::validation(def.name(), e.to_string()))?;

    for (name, value) in record.fields() {
        // check_fields guarantees the field exists
        if let Some(field) = def.field(name) {
            if !value.is_compatible(field) {
                let expected = if value.is_null() {
                    "a non-null value".to_string()
                } else {
                    format!("a {}", field.field_type)
                };
                return Err(DataError::validation(
                    def.name(),
                    format!("field '{}' expects {}, got {}", name, expected, value.type_name()),
                ));
            }
        }
    }
    Ok(())
}
