//! User entity backed by the `users` table.

use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::entity::{integer_field, string_field, timestamp_field, Entity};
use crate::domain::definition::{EntityDefinition, FieldDef};
use crate::domain::value_objects::Record;
use crate::errors::MappingError;

static USER_DEFINITION: Lazy<EntityDefinition> = Lazy::new(|| {
    EntityDefinition::new(
        "users",
        vec![
            FieldDef::integer("id").primary_key().auto_increment(),
            FieldDef::string("username").size(64).not_null(),
            FieldDef::string("password").size(64).not_null(),
            FieldDef::integer("status").size(4).not_null().default_value(0),
            FieldDef::timestamp("create_time").not_null(),
        ],
    )
    .expect("user definition is valid")
});

/// Account status as stored in the `status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Deleted,
}

impl UserStatus {
    pub fn code(self) -> i64 {
        match self {
            UserStatus::Active => 0,
            UserStatus::Deleted => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(UserStatus::Active),
            1 => Some(UserStatus::Deleted),
            _ => None,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Generated identifier, `None` until persisted
    pub id: Option<i64>,

    pub username: String,

    pub password: String,

    pub status: UserStatus,

    /// Creation time, whole seconds (the column is a plain DATETIME)
    pub create_time: DateTime<Utc>,
}

impl User {
    /// Creates a new, not yet persisted user
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: password.into(),
            status: UserStatus::Active,
            create_time: Utc::now().trunc_subsecs(0),
        }
    }

    /// Marks the user as deleted without removing the row
    pub fn mark_deleted(&mut self) {
        self.status = UserStatus::Deleted;
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

impl Entity for User {
    fn definition() -> &'static EntityDefinition {
        &USER_DEFINITION
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn into_record(self) -> Record {
        let mut record = Record::new()
            .with("username", self.username)
            .with("password", self.password)
            .with("status", self.status.code())
            .with("create_time", self.create_time);
        record.id = self.id;
        record
    }

    fn from_record(record: Record) -> Result<Self, MappingError> {
        let def = Self::definition();
        let code = integer_field(&record, def, "status")?;
        let status = UserStatus::from_code(code).ok_or_else(|| MappingError::InvalidValue {
            entity: def.name().to_string(),
            field: "status".to_string(),
            reason: format!("unknown status code {}", code),
        })?;

        Ok(Self {
            id: record.id,
            username: string_field(&record, def, "username")?,
            password: string_field(&record, def, "password")?,
            status,
            create_time: timestamp_field(&record, def, "create_time")?,
        })
    }
}
