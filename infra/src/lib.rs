//! # Infrastructure Layer
//!
//! MySQL implementation of the data-access layer:
//!
//! - **Connection pool**: bounded, lifetime-aware pool of `sqlx` connections
//! - **Schema synchronizer**: creates tables and adds missing columns
//! - **Statement executor**: parameterized insert/select/update/delete
//! - **CRUD store**: [`MySqlCrudStore`](database::MySqlCrudStore), the
//!   `CrudStore` implementation the HTTP layer binds to
//!
//! [`initialize`] wires these together for one process.

// Re-export core types for convenience
pub use mc_core::errors::*;

/// Database module - MySQL implementations using SQLx
pub mod database;

use std::sync::Arc;

use mc_core::domain::EntityDefinition;
use mc_core::repositories::CrudStore;
use mc_shared::config::{ConfigError, DatabaseConfig};

use database::{DatabasePool, MySqlCrudStore, SchemaSynchronizer};

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    pub pool: DatabasePool,
    pub schema: SchemaSynchronizer,
}

impl InfrastructureServices {
    /// Create a CRUD store for `definition` sharing this pool
    pub fn store(&self, definition: &EntityDefinition) -> Arc<dyn CrudStore> {
        Arc::new(MySqlCrudStore::new(self.pool.clone(), definition.clone()))
    }

    /// Close the pool; call during shutdown
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}

/// Initialize infrastructure services
///
/// This function:
/// - Validates the database configuration
/// - Creates the connection pool and checks the server is reachable
/// - Synchronizes the tables of `definitions`, in order
pub async fn initialize(
    config: &DatabaseConfig,
    definitions: &[&EntityDefinition],
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    config.validate()?;
    let pool = DatabasePool::connect(config.clone()).await?;
    let schema = SchemaSynchronizer::new(pool.clone());

    for definition in definitions {
        let report = schema.ensure_table(definition).await?;
        tracing::info!(
            entity = definition.name(),
            created = report.created,
            added = report.added_columns.len(),
            "Schema synchronized"
        );
    }

    tracing::info!("Infrastructure services initialized successfully");
    Ok(InfrastructureServices { pool, schema })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Schema synchronization error
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
