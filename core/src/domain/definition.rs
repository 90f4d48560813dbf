//! Entity definitions: the static contract between application code and storage.
//!
//! An [`EntityDefinition`] is built once (usually in a `Lazy` static) and
//! consumed unchanged by the schema synchronizer, the statement executor and
//! the row mapper. Column identifiers in generated SQL only ever come from
//! a definition, so [`EntityDefinition::new`] rejects anything that is not a
//! plain identifier.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Value;
use crate::errors::{ExecError, SchemaError};

/// MySQL's identifier length limit
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    String,
    Timestamp,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Integer => f.write_str("integer"),
            FieldType::String => f.write_str("string"),
            FieldType::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// One declared field and its storage constraints
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub default: Option<Value>,
    /// Display width for integers, length for strings
    pub size: Option<u32>,
}

impl FieldDef {
    /// A nullable field without constraints
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
            size: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Timestamp)
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Whether a create must supply this field
    pub fn is_required(&self) -> bool {
        !self.nullable && self.default.is_none() && !self.auto_increment
    }
}

/// A named, ordered set of fields backed by one table
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDefinition {
    name: String,
    fields: Vec<FieldDef>,
}

impl EntityDefinition {
    /// Validate and build a definition
    ///
    /// The name doubles as the table name.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self, SchemaError> {
        let name = name.into();
        let invalid = |reason: String| SchemaError::InvalidDefinition {
            entity: name.clone(),
            reason,
        };

        if !is_valid_identifier(&name) {
            return Err(invalid(format!("'{}' is not a valid table name", name)));
        }
        if fields.is_empty() {
            return Err(invalid("no fields declared".to_string()));
        }

        let mut seen = HashSet::new();
        let mut primary_keys = 0;
        for field in &fields {
            if !is_valid_identifier(&field.name) {
                return Err(invalid(format!("'{}' is not a valid column name", field.name)));
            }
            if !seen.insert(field.name.to_ascii_lowercase()) {
                return Err(invalid(format!("duplicate field '{}'", field.name)));
            }
            if field.primary_key {
                primary_keys += 1;
                if field.field_type != FieldType::Integer {
                    return Err(invalid(format!(
                        "primary key '{}' must be an integer",
                        field.name
                    )));
                }
            }
            if field.auto_increment && !field.primary_key {
                return Err(invalid(format!(
                    "auto-increment field '{}' must be the primary key",
                    field.name
                )));
            }
            if let Some(default) = &field.default {
                if !default.is_compatible(field) {
                    return Err(invalid(format!(
                        "default for '{}' is not a {}",
                        field.name, field.field_type
                    )));
                }
            }
        }
        if primary_keys > 1 {
            return Err(invalid("more than one primary key".to_string()));
        }

        Ok(Self { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing table name
    pub fn table(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields an insert writes: everything but the generated key
    pub fn insertable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.auto_increment)
    }

    /// Fields an update may overwrite: everything but the primary key
    pub fn updatable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.primary_key)
    }

    /// Resolve a caller-supplied column reference against the declared fields
    pub fn resolve(&self, column: &str) -> Result<&FieldDef, ExecError> {
        self.field(column).ok_or_else(|| ExecError::UnknownColumn {
            entity: self.name.clone(),
            column: column.to_string(),
        })
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, at most [`MAX_IDENTIFIER_LEN`] bytes
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= MAX_IDENTIFIER_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> EntityDefinition {
        EntityDefinition::new(
            "users",
            vec![
                FieldDef::integer("id").primary_key().auto_increment(),
                FieldDef::string("username").size(64),
                FieldDef::string("password").size(64),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_definition_accessors() {
        let def = users();
        assert_eq!(def.table(), "users");
        assert_eq!(def.primary_key().unwrap().name, "id");
        assert_eq!(def.column_names().collect::<Vec<_>>(), vec!["id", "username", "password"]);
        assert_eq!(def.insertable_fields().count(), 2);
        assert_eq!(def.position("password"), Some(2));
    }

    #[test]
    fn test_empty_definition_rejected() {
        let result = EntityDefinition::new("users", vec![]);
        assert!(matches!(result, Err(SchemaError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_injection_in_identifiers_rejected() {
        assert!(EntityDefinition::new("users; DROP TABLE x", vec![FieldDef::integer("id")]).is_err());
        assert!(EntityDefinition::new("users", vec![FieldDef::string("name`")]).is_err());
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier(""));
        assert!(is_valid_identifier("_create_time2"));
    }

    #[test]
    fn test_constraint_rules() {
        let duplicate = EntityDefinition::new(
            "t",
            vec![FieldDef::integer("a"), FieldDef::string("A")],
        );
        assert!(duplicate.is_err());

        let string_key = EntityDefinition::new("t", vec![FieldDef::string("code").primary_key()]);
        assert!(string_key.is_err());

        let loose_auto = EntityDefinition::new("t", vec![FieldDef::integer("n").auto_increment()]);
        assert!(loose_auto.is_err());

        let bad_default = EntityDefinition::new(
            "t",
            vec![FieldDef::integer("status").default_value("active")],
        );
        assert!(bad_default.is_err());
    }

    #[test]
    fn test_resolve_unknown_column() {
        let err = users().resolve("email").unwrap_err();
        assert!(matches!(err, ExecError::UnknownColumn { column, .. } if column == "email"));
    }

    #[test]
    fn test_required_fields() {
        assert!(!FieldDef::integer("id").primary_key().auto_increment().is_required());
        assert!(FieldDef::string("name").not_null().is_required());
        assert!(!FieldDef::integer("status").not_null().default_value(0).is_required());
        assert!(!FieldDef::string("nick").is_required());
    }
}
