//! Parameterized statements built from an entity definition.
//!
//! SQL text only ever contains backtick-quoted identifiers taken from the
//! [`EntityDefinition`] and `?` placeholders; every value is bound.
//! Selects list columns in declaration order so result rows can be decoded
//! ordinally by [`RowMapper::decode`](mc_core::RowMapper::decode).

use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, Row as _};
use tracing::debug;

use mc_core::domain::{EntityDefinition, FieldDef, FieldType, Row, Value};
use mc_core::errors::{DataResult, ExecError, MappingError, Operation};

/// Column reference and the value bound to it
pub type Assignment<'a> = (&'a str, Value);

/// Outcome of an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    /// `LAST_INSERT_ID()` of the statement, 0 without an auto-increment key
    pub generated_id: u64,
    pub affected_rows: u64,
}

/// Renders statement text for one entity
pub struct SqlBuilder;

impl SqlBuilder {
    /// `INSERT INTO t (a, b) VALUES (?, ?)`
    ///
    /// With no fields every column takes its default.
    pub fn insert(def: &EntityDefinition, fields: &[&FieldDef]) -> String {
        let columns = join(fields.iter().map(|f| quote(&f.name)));
        let placeholders = placeholders(fields.len());
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(def.table()),
            columns,
            placeholders
        )
    }

    /// `SELECT <all columns> FROM t WHERE p = ? LIMIT 1`
    pub fn select_one(def: &EntityDefinition, predicate: &FieldDef) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
            select_list(def),
            quote(def.table()),
            quote(&predicate.name)
        )
    }

    /// `SELECT <all columns> FROM t [WHERE p = ?] [ORDER BY pk] [LIMIT ?]`
    ///
    /// A `limit` of 0 renders no `LIMIT` clause.
    pub fn select_many(def: &EntityDefinition, predicate: Option<&FieldDef>, limit: u64) -> String {
        let mut sql = format!("SELECT {} FROM {}", select_list(def), quote(def.table()));
        if let Some(predicate) = predicate {
            sql.push_str(&format!(" WHERE {} = ?", quote(&predicate.name)));
        }
        if let Some(pk) = def.primary_key() {
            sql.push_str(&format!(" ORDER BY {}", quote(&pk.name)));
        }
        if limit > 0 {
            sql.push_str(" LIMIT ?");
        }
        sql
    }

    /// `UPDATE t SET a = ?, b = ? WHERE p = ?`
    pub fn update(def: &EntityDefinition, set: &[&FieldDef], predicate: &FieldDef) -> Result<String, ExecError> {
        if set.is_empty() {
            return Err(ExecError::NoColumns {
                entity: def.name().to_string(),
                operation: Operation::Update,
            });
        }
        let assignments = join(set.iter().map(|f| format!("{} = ?", quote(&f.name))));
        Ok(format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote(def.table()),
            assignments,
            quote(&predicate.name)
        ))
    }

    /// `DELETE FROM t WHERE p = ?`
    pub fn delete(def: &EntityDefinition, predicate: &FieldDef) -> String {
        format!(
            "DELETE FROM {} WHERE {} = ?",
            quote(def.table()),
            quote(&predicate.name)
        )
    }
}

/// Backtick-quote an identifier already validated by the definition
pub(crate) fn quote(identifier: &str) -> String {
    format!("`{}`", identifier)
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn select_list(def: &EntityDefinition) -> String {
    join(def.column_names().map(quote))
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(v) => query.bind(*v),
        Value::String(v) => query.bind(v.clone()),
        Value::Timestamp(v) => query.bind(*v),
    }
}

fn bind_all<'q>(sql: &'q str, values: &[Value]) -> Query<'q, MySql, MySqlArguments> {
    values.iter().fold(sqlx::query(sql), bind_value)
}

/// Read one result row ordinally, per declared field type
pub fn decode_row(def: &EntityDefinition, row: &MySqlRow) -> Result<Row, MappingError> {
    if row.len() != def.fields().len() {
        return Err(MappingError::ColumnCount {
            entity: def.name().to_string(),
            expected: def.fields().len(),
            actual: row.len(),
        });
    }

    def.fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let value = match field.field_type {
                FieldType::Integer => row.try_get::<Option<i64>, _>(index).map(Value::from),
                FieldType::String => row.try_get::<Option<String>, _>(index).map(Value::from),
                FieldType::Timestamp => row
                    .try_get::<Option<DateTime<Utc>>, _>(index)
                    .map(Value::from),
            };
            value.map_err(|e| MappingError::Decode {
                entity: def.name().to_string(),
                field: field.name.clone(),
                source: e.into(),
            })
        })
        .collect()
}

/// Executes statements for one entity on a borrowed connection
///
/// Errors are returned as they come; nothing is retried here.
#[derive(Debug, Clone, Copy)]
pub struct StatementExecutor<'d> {
    def: &'d EntityDefinition,
}

impl<'d> StatementExecutor<'d> {
    pub fn new(def: &'d EntityDefinition) -> Self {
        Self { def }
    }

    pub fn definition(&self) -> &'d EntityDefinition {
        self.def
    }

    fn resolve_all<'a>(&self, assignments: &'a [Assignment<'a>]) -> Result<(Vec<&'d FieldDef>, Vec<Value>), ExecError> {
        let mut fields = Vec::with_capacity(assignments.len());
        let mut values = Vec::with_capacity(assignments.len());
        for (column, value) in assignments {
            fields.push(self.def.resolve(column)?);
            values.push(value.clone());
        }
        Ok((fields, values))
    }

    fn log(&self, operation: Operation, sql: &str) {
        debug!(entity = self.def.name(), operation = %operation, sql, "Executing statement");
    }

    fn failed(&self, operation: Operation) -> impl FnOnce(sqlx::Error) -> ExecError + '_ {
        move |e| {
            tracing::error!(entity = self.def.name(), operation = %operation, "Statement failed: {}", e);
            ExecError::database(self.def.name(), operation, e)
        }
    }

    /// Insert one row
    pub async fn insert(
        &self,
        connection: &mut MySqlConnection,
        values: &[Assignment<'_>],
    ) -> Result<InsertResult, ExecError> {
        let (fields, values) = self.resolve_all(values)?;
        let sql = SqlBuilder::insert(self.def, &fields);
        self.log(Operation::Insert, &sql);

        let result = bind_all(&sql, &values)
            .execute(connection)
            .await
            .map_err(self.failed(Operation::Insert))?;

        Ok(InsertResult {
            generated_id: result.last_insert_id(),
            affected_rows: result.rows_affected(),
        })
    }

    /// First row whose `column` equals `value`
    pub async fn select_one(
        &self,
        connection: &mut MySqlConnection,
        column: &str,
        value: Value,
    ) -> DataResult<Option<Row>> {
        let predicate = self.def.resolve(column)?;
        let sql = SqlBuilder::select_one(self.def, predicate);
        self.log(Operation::Select, &sql);

        let row = bind_all(&sql, &[value])
            .fetch_optional(connection)
            .await
            .map_err(self.failed(Operation::Select))?;

        match row {
            Some(row) => Ok(Some(decode_row(self.def, &row)?)),
            None => Ok(None),
        }
    }

    /// Prepare a multi-row select; rows are read by [`SelectMany::fetch`]
    ///
    /// `filter` restricts rows to those whose column equals the value;
    /// `limit` 0 means unbounded.
    pub fn select_many(&self, filter: Option<Assignment<'_>>, limit: u64) -> Result<SelectMany<'d>, ExecError> {
        let mut params = Vec::new();
        let predicate = match filter {
            Some((column, value)) => {
                params.push(value);
                Some(self.def.resolve(column)?)
            }
            None => None,
        };
        if limit > 0 {
            params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        Ok(SelectMany {
            def: self.def,
            sql: SqlBuilder::select_many(self.def, predicate, limit),
            params,
        })
    }

    /// Set `set` columns on rows whose `column` equals `value`
    pub async fn update(
        &self,
        connection: &mut MySqlConnection,
        set: &[Assignment<'_>],
        column: &str,
        value: Value,
    ) -> Result<u64, ExecError> {
        let (fields, mut values) = self.resolve_all(set)?;
        let predicate = self.def.resolve(column)?;
        let sql = SqlBuilder::update(self.def, &fields, predicate)?;
        self.log(Operation::Update, &sql);
        values.push(value);

        let result = bind_all(&sql, &values)
            .execute(connection)
            .await
            .map_err(self.failed(Operation::Update))?;
        Ok(result.rows_affected())
    }

    /// Delete rows whose `column` equals `value`
    pub async fn delete(
        &self,
        connection: &mut MySqlConnection,
        column: &str,
        value: Value,
    ) -> Result<u64, ExecError> {
        let predicate = self.def.resolve(column)?;
        let sql = SqlBuilder::delete(self.def, predicate);
        self.log(Operation::Delete, &sql);

        let result = bind_all(&sql, &[value])
            .execute(connection)
            .await
            .map_err(self.failed(Operation::Delete))?;
        Ok(result.rows_affected())
    }
}

/// A prepared multi-row select owning its text and parameters
#[derive(Debug, Clone)]
pub struct SelectMany<'d> {
    def: &'d EntityDefinition,
    sql: String,
    params: Vec<Value>,
}

impl<'d> SelectMany<'d> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Stream the result rows, one-shot and in primary key order
    ///
    /// The stream borrows the connection until it is dropped. Dropping it
    /// before exhaustion abandons the cursor; the connection discards the
    /// unread rows before its next statement, so it can go straight back
    /// to the pool.
    pub fn fetch<'a>(&'a self, connection: &'a mut MySqlConnection) -> BoxStream<'a, DataResult<Row>>
    where
        'd: 'a,
    {
        debug!(entity = self.def.name(), operation = %Operation::Select, sql = %self.sql, "Executing statement");
        let def = self.def;
        bind_all(&self.sql, &self.params)
            .fetch(connection)
            .map(move |row| -> DataResult<Row> {
                let row = row.map_err(|e| ExecError::database(def.name(), Operation::Select, e))?;
                Ok(decode_row(def, &row)?)
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::domain::{Entity, User};

    fn users() -> &'static EntityDefinition {
        User::definition()
    }

    fn field<'a>(def: &'a EntityDefinition, name: &str) -> &'a FieldDef {
        def.field(name).unwrap()
    }

    #[test]
    fn test_insert_text() {
        let def = users();
        let sql = SqlBuilder::insert(def, &[field(def, "username"), field(def, "password")]);
        assert_eq!(sql, "INSERT INTO `users` (`username`, `password`) VALUES (?, ?)");

        assert_eq!(SqlBuilder::insert(def, &[]), "INSERT INTO `users` () VALUES ()");
    }

    #[test]
    fn test_select_text_lists_columns_in_declared_order() {
        let def = users();
        assert_eq!(
            SqlBuilder::select_one(def, field(def, "id")),
            "SELECT `id`, `username`, `password`, `status`, `create_time` FROM `users` WHERE `id` = ? LIMIT 1"
        );
    }

    #[test]
    fn test_select_many_limit_zero_is_unbounded() {
        let def = users();
        let unbounded = SqlBuilder::select_many(def, None, 0);
        assert!(unbounded.ends_with("FROM `users` ORDER BY `id`"));

        let bounded = SqlBuilder::select_many(def, Some(field(def, "status")), 10);
        assert!(bounded.ends_with("WHERE `status` = ? ORDER BY `id` LIMIT ?"));
    }

    #[test]
    fn test_update_and_delete_text() {
        let def = users();
        let sql = SqlBuilder::update(def, &[field(def, "username")], field(def, "id")).unwrap();
        assert_eq!(sql, "UPDATE `users` SET `username` = ? WHERE `id` = ?");

        assert!(matches!(
            SqlBuilder::update(def, &[], field(def, "id")),
            Err(ExecError::NoColumns { .. })
        ));

        assert_eq!(
            SqlBuilder::delete(def, field(def, "id")),
            "DELETE FROM `users` WHERE `id` = ?"
        );
    }

    #[test]
    fn test_values_never_reach_the_text() {
        let executor = StatementExecutor::new(users());
        let statement = executor
            .select_many(Some(("username", Value::from("x' OR '1'='1"))), 5)
            .unwrap();

        assert!(!statement.sql().contains("'1'='1"));
        assert_eq!(
            statement.sql(),
            "SELECT `id`, `username`, `password`, `status`, `create_time` FROM `users` \
             WHERE `username` = ? ORDER BY `id` LIMIT ?"
        );
        assert_eq!(
            statement.params(),
            &[Value::from("x' OR '1'='1"), Value::Integer(5)]
        );
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let executor = StatementExecutor::new(users());
        let err = executor
            .select_many(Some(("1=1; DROP TABLE users; --", Value::Null)), 0)
            .unwrap_err();
        assert!(matches!(err, ExecError::UnknownColumn { .. }));
    }
}
