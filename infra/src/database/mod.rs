//! Database module - MySQL implementations using SQLx
//!
//! This module provides the data-access layer over MySQL:
//! - Connection pool management (`connection`)
//! - Additive schema synchronization (`schema`)
//! - Parameterized statement execution (`statement`)
//! - The CRUD facade implementation (`mysql`)

pub mod connection;
pub mod mysql;
pub mod schema;
pub mod statement;


// Re-export commonly used types
pub use connection::{connect_options, DatabasePool, MySqlPooledConnection, PoolStatistics};
pub use mysql::MySqlCrudStore;
pub use schema::{DdlBuilder, SchemaSynchronizer, SyncReport};
pub use statement::{decode_row, Assignment, InsertResult, SelectMany, SqlBuilder, StatementExecutor};
