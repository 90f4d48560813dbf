//! MySQL implementation of the CrudStore trait.
//!
//! Every operation checks one connection out of the [`DatabasePool`] and
//! holds it for its whole statement sequence; the guard gives it back on
//! every exit path, including errors.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tracing::debug;

use mc_core::domain::{EntityDefinition, FieldDef, Record, Value};
use mc_core::errors::{DataError, DataResult, MappingError};
use mc_core::mapping::RowMapper;
use mc_core::repositories::{validate_changes, validate_create, CrudStore};

use crate::database::connection::DatabasePool;
use crate::database::statement::{Assignment, StatementExecutor};

/// CRUD operations for one entity stored in MySQL
#[derive(Clone)]
pub struct MySqlCrudStore {
    /// Database connection pool
    pool: DatabasePool,
    definition: EntityDefinition,
}

impl MySqlCrudStore {
    /// Create a store for `definition` backed by `pool`
    ///
    /// The table is expected to exist; run the schema synchronizer first.
    pub fn new(pool: DatabasePool, definition: EntityDefinition) -> Self {
        Self { pool, definition }
    }

    fn executor(&self) -> StatementExecutor<'_> {
        StatementExecutor::new(&self.definition)
    }

    fn primary_key(&self) -> DataResult<&FieldDef> {
        self.definition.primary_key().ok_or_else(|| {
            DataError::validation(self.definition.name(), "entity declares no primary key")
        })
    }

    /// Pair each field with its encoded value
    fn assignments<'f>(&self, record: &Record, fields: &[&'f FieldDef]) -> DataResult<Vec<Assignment<'f>>> {
        let values = RowMapper::encode_fields(record, &self.definition, fields.iter().copied())?;
        Ok(fields.iter().map(|f| f.name.as_str()).zip(values).collect())
    }
}

/// `LAST_INSERT_ID()` as a key value; `BIGINT UNSIGNED` can exceed `i64`
fn generated_key(def: &EntityDefinition, pk: &FieldDef, generated_id: u64) -> DataResult<i64> {
    i64::try_from(generated_id).map_err(|_| {
        DataError::from(MappingError::InvalidValue {
            entity: def.name().to_string(),
            field: pk.name.clone(),
            reason: format!("generated key {} does not fit a signed 64-bit id", generated_id),
        })
    })
}

#[async_trait]
impl CrudStore for MySqlCrudStore {
    fn definition(&self) -> &EntityDefinition {
        &self.definition
    }

    async fn create(&self, mut record: Record) -> DataResult<Record> {
        let def = &self.definition;
        validate_create(def, &record)?;

        // omitted fields fall back to the column default
        let fields: Vec<&FieldDef> = def
            .fields()
            .iter()
            .filter(|f| {
                if f.primary_key {
                    !f.auto_increment && record.id.is_some()
                } else {
                    record.contains(&f.name)
                }
            })
            .collect();
        let values = self.assignments(&record, &fields)?;

        let executor = self.executor();
        let mut connection = self.pool.acquire().await?;
        let result = executor.insert(&mut connection, &values).await?;

        let id = match def.primary_key() {
            Some(pk) if pk.auto_increment => Some(generated_key(def, pk, result.generated_id)?),
            Some(_) => record.id,
            None => None,
        };
        debug!(entity = def.name(), id = ?id, "Record created");

        let stored = match (def.primary_key(), id) {
            (Some(pk), Some(id)) => {
                executor
                    .select_one(&mut connection, &pk.name, Value::Integer(id))
                    .await?
            }
            _ => None,
        };
        match stored {
            Some(row) => Ok(RowMapper::decode(def, row)?),
            None => {
                record.id = id;
                RowMapper::complete(&mut record, def);
                Ok(record)
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> DataResult<Record> {
        let pk = self.primary_key()?;
        let mut connection = self.pool.acquire().await?;

        let row = self
            .executor()
            .select_one(&mut connection, &pk.name, Value::Integer(id))
            .await?
            .ok_or_else(|| DataError::not_found(self.definition.name(), id))?;

        Ok(RowMapper::decode(&self.definition, row)?)
    }

    async fn find_many(&self, limit: u64) -> DataResult<Vec<Record>> {
        let statement = self.executor().select_many(None, limit)?;
        let mut connection = self.pool.acquire().await?;

        let mut rows = statement.fetch(&mut connection);
        let mut records = Vec::new();
        while let Some(row) = rows.try_next().await? {
            records.push(RowMapper::decode(&self.definition, row)?);
        }
        Ok(records)
    }

    async fn update(&self, id: i64, changes: Record) -> DataResult<Record> {
        let def = &self.definition;
        let pk = self.primary_key()?;
        validate_changes(def, &changes)?;

        let executor = self.executor();
        let mut connection = self.pool.acquire().await?;

        let current = executor
            .select_one(&mut connection, &pk.name, Value::Integer(id))
            .await?
            .ok_or_else(|| DataError::not_found(def.name(), id))?;
        let mut record = RowMapper::decode(def, current)?;
        if changes.is_empty() {
            return Ok(record);
        }

        let fields: Vec<&FieldDef> = def
            .updatable_fields()
            .filter(|f| changes.contains(&f.name))
            .collect();
        let set = self.assignments(&changes, &fields)?;
        executor
            .update(&mut connection, &set, &pk.name, Value::Integer(id))
            .await?;

        debug!(entity = def.name(), id, fields = fields.len(), "Record updated");
        record.merge(&changes);
        Ok(record)
    }

    async fn delete(&self, id: i64) -> DataResult<u64> {
        let pk = self.primary_key()?;
        let mut connection = self.pool.acquire().await?;

        let affected = self
            .executor()
            .delete(&mut connection, &pk.name, Value::Integer(id))
            .await?;
        debug!(entity = self.definition.name(), id, affected, "Record deleted");
        Ok(affected)
    }
}
