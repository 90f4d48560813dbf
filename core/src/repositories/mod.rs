//! CRUD facade contract and its storage-independent implementations.

pub mod crud_store;
pub mod entity_repository;
pub mod memory;

pub use crud_store::{validate_changes, validate_create, CrudStore};
pub use entity_repository::EntityRepository;
pub use memory::InMemoryCrudStore;

#[cfg(test)]
mod tests;
