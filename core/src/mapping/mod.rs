//! Row mapper: entity instances to ordered column values and back.
//!
//! Binding is strictly ordinal. The column order used to build a statement
//! must be the order used to decode its rows; the mapper cannot detect a
//! swapped pair of same-typed columns, so callers derive both orders from
//! the same [`EntityDefinition`].

use crate::domain::{EntityDefinition, FieldDef, Record, Row, Value};
use crate::errors::MappingError;

pub struct RowMapper;

impl RowMapper {
    /// Encode every declared field in declaration order
    ///
    /// The primary key is taken from `record.id`; fields the record does
    /// not supply encode as NULL.
    pub fn encode(record: &Record, def: &EntityDefinition) -> Result<Row, MappingError> {
        Self::encode_fields(record, def, def.fields())
    }

    /// Encode the given fields, in the given order
    pub fn encode_fields<'d, I>(
        record: &Record,
        def: &EntityDefinition,
        fields: I,
    ) -> Result<Row, MappingError>
    where
        I: IntoIterator<Item = &'d FieldDef>,
    {
        Self::check_fields(record, def)?;
        fields
            .into_iter()
            .map(|field| Self::value_for(record, def, field))
            .collect()
    }

    /// Decode one result row selected with the definition's column order
    pub fn decode(def: &EntityDefinition, row: Row) -> Result<Record, MappingError> {
        if row.len() != def.fields().len() {
            return Err(MappingError::ColumnCount {
                entity: def.name().to_string(),
                expected: def.fields().len(),
                actual: row.len(),
            });
        }

        let mut record = Record::new();
        for (field, value) in def.fields().iter().zip(row) {
            if !value.is_compatible(field) {
                return Err(mismatch(def, field, &value));
            }
            if field.primary_key {
                record.id = value.as_i64();
            } else {
                record.set(field.name.clone(), value);
            }
        }
        Ok(record)
    }

    /// Reject fields the definition does not declare
    pub fn check_fields(record: &Record, def: &EntityDefinition) -> Result<(), MappingError> {
        for (name, _) in record.fields() {
            match def.field(name) {
                None => {
                    return Err(MappingError::UnknownField {
                        entity: def.name().to_string(),
                        field: name.to_string(),
                    })
                }
                Some(field) if field.primary_key => {
                    return Err(MappingError::InvalidValue {
                        entity: def.name().to_string(),
                        field: name.to_string(),
                        reason: "the primary key is carried by the record id".to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Fill every field the record omits with its declared default, or NULL
    pub fn complete(record: &mut Record, def: &EntityDefinition) {
        for field in def.updatable_fields() {
            if !record.contains(&field.name) {
                let value = field.default.clone().unwrap_or(Value::Null);
                record.set(field.name.clone(), value);
            }
        }
    }

    fn value_for(record: &Record, def: &EntityDefinition, field: &FieldDef) -> Result<Value, MappingError> {
        let value = if field.primary_key {
            Value::from(record.id)
        } else {
            record.get(&field.name).cloned().unwrap_or(Value::Null)
        };

        // a NULL auto-increment key asks the database to generate one
        if value.is_null() && field.auto_increment {
            return Ok(value);
        }
        if !value.is_compatible(field) {
            return Err(mismatch(def, field, &value));
        }
        Ok(value)
    }
}

fn mismatch(def: &EntityDefinition, field: &FieldDef, value: &Value) -> MappingError {
    MappingError::TypeMismatch {
        entity: def.name().to_string(),
        field: field.name.clone(),
        expected: field.field_type,
        actual: value.type_name(),
    }
}

#[cfg(test)]
mod tests;
