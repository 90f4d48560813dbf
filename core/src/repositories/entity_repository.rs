//! Typed facade over a [`CrudStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::{Entity, Record};
use crate::errors::DataResult;

use super::crud_store::CrudStore;

/// Entity-typed CRUD operations for `E`
///
/// The wrapped store must be bound to `E::definition()`.
pub struct EntityRepository<E> {
    store: Arc<dyn CrudStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(store: Arc<dyn CrudStore>) -> Self {
        debug_assert_eq!(store.definition().name(), E::definition().name());
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn CrudStore> {
        &self.store
    }

    /// Persist `entity`, returning it with its generated id
    pub async fn create(&self, entity: E) -> DataResult<E> {
        let record = self.store.create(entity.into_record()).await?;
        Ok(E::from_record(record)?)
    }

    pub async fn find_by_id(&self, id: i64) -> DataResult<E> {
        let record = self.store.find_by_id(id).await?;
        Ok(E::from_record(record)?)
    }

    /// At most `limit` entities in id order, all of them when `limit` is 0
    pub async fn find_many(&self, limit: u64) -> DataResult<Vec<E>> {
        self.store
            .find_many(limit)
            .await?
            .into_iter()
            .map(|record| E::from_record(record).map_err(Into::into))
            .collect()
    }

    /// Overwrite every field of the stored entity `id` with `entity`'s
    ///
    /// `entity`'s own id is ignored.
    pub async fn update(&self, id: i64, entity: E) -> DataResult<E> {
        let mut changes = entity.into_record();
        changes.id = None;
        self.patch(id, changes).await
    }

    /// Overwrite only the fields present in `changes`
    pub async fn patch(&self, id: i64, changes: Record) -> DataResult<E> {
        let record = self.store.update(id, changes).await?;
        Ok(E::from_record(record)?)
    }

    pub async fn delete(&self, id: i64) -> DataResult<u64> {
        self.store.delete(id).await
    }
}
