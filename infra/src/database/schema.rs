//! Additive schema synchronization.
//!
//! [`SchemaSynchronizer::ensure_table`] creates a missing table, or adds
//! the columns a definition declares that an existing table lacks. It never
//! drops, renames or retypes a column, and it does not retrofit a primary
//! key onto an existing table. Run it once at startup, before serving
//! traffic; concurrent runs against the same table are not serialized.

use sqlx::mysql::MySqlConnection;
use sqlx::Row;
use std::collections::HashSet;
use tracing::{info, warn};

use mc_core::domain::{EntityDefinition, FieldDef, FieldType, Value};
use mc_core::errors::{Operation, SchemaError};

use super::connection::DatabasePool;
use super::statement::quote;

const DEFAULT_VARCHAR_LEN: u32 = 255;

/// What [`SchemaSynchronizer::ensure_table`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// The table did not exist and was created
    pub created: bool,
    /// Columns added to an existing table, in declaration order
    pub added_columns: Vec<String>,
}

impl SyncReport {
    pub fn is_unchanged(&self) -> bool {
        !self.created && self.added_columns.is_empty()
    }
}

/// Renders the DDL for a definition
pub struct DdlBuilder;

impl DdlBuilder {
    /// MySQL column type of a field
    pub fn column_type(field: &FieldDef) -> String {
        match (field.field_type, field.size) {
            (FieldType::Integer, Some(size)) => format!("INT({})", size),
            (FieldType::Integer, None) => "BIGINT".to_string(),
            (FieldType::String, size) => format!("VARCHAR({})", size.unwrap_or(DEFAULT_VARCHAR_LEN)),
            (FieldType::Timestamp, _) => "DATETIME".to_string(),
        }
    }

    /// Column definition; `with_key` keeps `AUTO_INCREMENT`
    pub fn column_definition(field: &FieldDef, with_key: bool) -> String {
        let mut column = format!("{} {}", quote(&field.name), Self::column_type(field));
        if !field.nullable {
            column.push_str(" NOT NULL");
        }
        if with_key && field.auto_increment {
            column.push_str(" AUTO_INCREMENT");
        }
        if let Some(default) = &field.default {
            column.push_str(" DEFAULT ");
            column.push_str(&Self::literal(default));
        }
        column
    }

    /// `CREATE TABLE IF NOT EXISTS` with every column and the primary key
    pub fn create_table(def: &EntityDefinition) -> String {
        let mut columns: Vec<String> = def
            .fields()
            .iter()
            .map(|field| Self::column_definition(field, true))
            .collect();
        if let Some(pk) = def.primary_key() {
            columns.push(format!("PRIMARY KEY ({})", quote(&pk.name)));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            quote(def.table()),
            columns.join(",\n  ")
        )
    }

    /// `ALTER TABLE .. ADD COLUMN`, never carrying key attributes
    pub fn add_column(def: &EntityDefinition, field: &FieldDef) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            quote(def.table()),
            Self::column_definition(field, false)
        )
    }

    /// Escaped SQL literal for a DDL default (DDL cannot bind parameters)
    pub fn literal(value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(v) => v.to_string(),
            Value::String(v) => format!("'{}'", v.replace('\\', "\\\\").replace('\'', "''")),
            Value::Timestamp(v) => format!(
                "'{}'",
                v.naive_utc().format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

/// Reconciles entity definitions with live tables
#[derive(Clone)]
pub struct SchemaSynchronizer {
    pool: DatabasePool,
}

impl SchemaSynchronizer {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Make sure the table for `def` exists with every declared column
    ///
    /// Running it again with the same definition changes nothing.
    pub async fn ensure_table(&self, def: &EntityDefinition) -> Result<SyncReport, SchemaError> {
        let entity = def.name().to_string();
        let fail = |operation: Operation| {
            let entity = entity.clone();
            move |e: sqlx::Error| {
                tracing::error!(entity = %entity, operation = %operation, "Schema synchronization failed: {}", e);
                SchemaError::Database {
                    entity,
                    operation,
                    source: e.into(),
                }
            }
        };

        let mut connection = self.pool.acquire().await.map_err(|e| SchemaError::Database {
            entity: entity.clone(),
            operation: Operation::Connect,
            source: e.into(),
        })?;

        let existing = existing_columns(&mut connection, def)
            .await
            .map_err(fail(Operation::Introspect))?;

        if existing.is_empty() {
            let ddl = DdlBuilder::create_table(def);
            tracing::debug!(entity = %entity, sql = %ddl, "Creating table");
            sqlx::query(&ddl)
                .execute(&mut *connection)
                .await
                .map_err(fail(Operation::CreateTable))?;

            info!(entity = %entity, table = def.table(), "Table created");
            return Ok(SyncReport {
                created: true,
                added_columns: Vec::new(),
            });
        }

        let mut report = SyncReport::default();
        for field in def.fields() {
            if existing.contains(&field.name.to_ascii_lowercase()) {
                continue;
            }
            if field.primary_key {
                warn!(
                    entity = %entity,
                    column = %field.name,
                    "Existing table lacks its primary key column; adding it as a plain column"
                );
            }

            let ddl = DdlBuilder::add_column(def, field);
            tracing::debug!(entity = %entity, sql = %ddl, "Adding column");
            sqlx::query(&ddl)
                .execute(&mut *connection)
                .await
                .map_err(fail(Operation::AlterTable))?;
            report.added_columns.push(field.name.clone());
        }

        if report.is_unchanged() {
            tracing::debug!(entity = %entity, "Table is up to date");
        } else {
            info!(entity = %entity, added = ?report.added_columns, "Table columns added");
        }
        Ok(report)
    }
}

/// Lower-cased column names of the definition's table; empty if absent
async fn existing_columns(
    connection: &mut MySqlConnection,
    def: &EntityDefinition,
) -> Result<HashSet<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(column_name AS CHAR) AS column_name
        FROM information_schema.columns
        WHERE table_schema = DATABASE() AND table_name = ?
        "#,
    )
    .bind(def.table())
    .fetch_all(connection)
    .await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>(0).map(|name| name.to_ascii_lowercase()))
        .collect()
}
