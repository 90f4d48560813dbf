//! In-memory [`CrudStore`] for embedding tests and database-free runs

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::crud_store::{validate_changes, validate_create, CrudStore};
use crate::domain::{EntityDefinition, Record};
use crate::errors::{DataError, DataResult};
use crate::mapping::RowMapper;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<i64, Record>,
    next_id: i64,
}

/// A store keeping rows in a lock-guarded ordered map
///
/// Generated ids start at 1 and are never reused, like an
/// `AUTO_INCREMENT` column.
#[derive(Debug)]
pub struct InMemoryCrudStore {
    definition: EntityDefinition,
    table: RwLock<Table>,
}

impl InMemoryCrudStore {
    pub fn new(definition: EntityDefinition) -> Self {
        Self {
            definition,
            table: RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CrudStore for InMemoryCrudStore {
    fn definition(&self) -> &EntityDefinition {
        &self.definition
    }

    async fn create(&self, mut record: Record) -> DataResult<Record> {
        let def = &self.definition;
        validate_create(def, &record)?;

        let mut table = self.table.write().await;
        let generated = def.primary_key().map_or(true, |pk| pk.auto_increment);
        let id = match record.id {
            Some(id) if !generated => {
                if table.rows.contains_key(&id) {
                    return Err(DataError::validation(
                        def.name(),
                        format!("duplicate primary key {}", id),
                    ));
                }
                id
            }
            _ => table.next_id,
        };
        table.next_id = match id.checked_add(1) {
            Some(next) => table.next_id.max(next),
            None if generated => {
                return Err(DataError::validation(def.name(), "generated key space exhausted"));
            }
            None => table.next_id,
        };

        record.id = Some(id);
        RowMapper::complete(&mut record, def);
        table.rows.insert(id, record.clone());

        debug!(entity = def.name(), id, "Record created");
        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> DataResult<Record> {
        let table = self.table.read().await;
        table
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| DataError::not_found(self.definition.name(), id))
    }

    async fn find_many(&self, limit: u64) -> DataResult<Vec<Record>> {
        let table = self.table.read().await;
        let take = if limit == 0 { usize::MAX } else { limit as usize };
        Ok(table.rows.values().take(take).cloned().collect())
    }

    async fn update(&self, id: i64, changes: Record) -> DataResult<Record> {
        let def = &self.definition;
        validate_changes(def, &changes)?;

        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or_else(|| DataError::not_found(def.name(), id))?;
        stored.merge(&changes);

        debug!(entity = def.name(), id, fields = changes.len(), "Record updated");
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> DataResult<u64> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).map_or(0, |_| 1))
    }
}
