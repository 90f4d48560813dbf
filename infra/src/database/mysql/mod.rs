//! MySQL-backed CRUD stores

pub mod crud_store;

pub use crud_store::MySqlCrudStore;
