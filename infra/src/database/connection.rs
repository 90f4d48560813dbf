//! Database connection pool management
//!
//! [`DatabasePool`] wraps a SQLx MySQL pool configured from
//! [`DatabaseConfig`]: `max_open_connections` caps the live connections and
//! `max_lifetime` retires connections by age. It is constructed explicitly
//! at startup and handed to the schema synchronizer and the CRUD stores;
//! there is no process-wide handle.
//!
//! Returned connections are checked by SQLx before reuse, so a connection
//! left mid-statement by a cancelled request is closed rather than lent out
//! again.

use std::fmt;
use std::time::Duration;

use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{ConnectOptions, MySqlPool, Row};
use tracing::log::LevelFilter;

use mc_core::errors::ConnectionError;
use mc_shared::config::{DatabaseConfig, Network};

/// A connection checked out of a [`DatabasePool`]; returns to the pool on drop
pub type MySqlPooledConnection = PoolConnection<MySql>;

/// Connection pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatistics {
    /// Live connections, idle or in use
    pub open: u32,
    /// Connections waiting in the idle queue
    pub idle: u32,
    /// Connections lent to callers
    pub in_use: u32,
    /// Pool ceiling
    pub max_open: u32,
}

impl fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle, {} in use)",
            self.open, self.max_open, self.idle, self.in_use
        )
    }
}

/// Build connect options from configuration
///
/// For [`Network::Unix`] the configured host is the socket path.
pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .username(&config.username)
        .database(&config.database);

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    options = match config.network {
        Network::Tcp => options.host(&config.host).port(config.port),
        Network::Unix => options.socket(&config.host),
    };

    // Configure statement logging
    if config.enable_logging {
        options
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(
                LevelFilter::Warn,
                Duration::from_millis(config.slow_query_threshold),
            )
    } else {
        options.disable_statement_logging()
    }
}

/// Translate a SQLx pool error into the data-access taxonomy
fn acquire_error(error: sqlx::Error, waited: Duration) -> ConnectionError {
    match error {
        sqlx::Error::PoolClosed => ConnectionError::PoolClosed,
        sqlx::Error::PoolTimedOut => ConnectionError::Timeout { waited },
        other => {
            tracing::error!("Failed to open database connection: {}", other);
            ConnectionError::Open {
                source: other.into(),
            }
        }
    }
}

/// Database connection pool wrapper
///
/// Cheap to clone; clones share the same connections.
#[derive(Clone)]
pub struct DatabasePool {
    /// SQLx MySQL connection pool
    pool: MySqlPool,
    /// Configuration used to create this pool
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Create a pool without opening any connection yet
    ///
    /// Must be called inside a Tokio runtime: SQLx spawns the task that
    /// retires idle and over-age connections.
    ///
    /// # Example
    /// ```no_run
    /// use mc_infra::database::DatabasePool;
    /// use mc_shared::config::DatabaseConfig;
    ///
    /// async fn create_pool() -> Result<DatabasePool, Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::new("127.0.0.1", "test").with_credentials("root", "");
    ///     let pool = DatabasePool::new(config);
    ///     pool.health_check().await?;
    ///     Ok(pool)
    /// }
    /// ```
    pub fn new(config: DatabaseConfig) -> Self {
        tracing::info!(
            dsn = %config.display_dsn(),
            "Creating database connection pool with max_open_connections: {}, max_lifetime: {}s",
            config.max_open_connections,
            config.max_lifetime
        );

        let pool = MySqlPoolOptions::new()
            // Connection pool size
            .max_connections(config.max_open_connections.max(1))
            .min_connections(0)
            // Connection lifecycle
            .max_lifetime(config.max_lifetime())
            .acquire_timeout(config.acquire_timeout())
            // Test connections before returning from pool
            .test_before_acquire(true)
            .connect_lazy_with(connect_options(&config));

        Self { pool, config }
    }

    /// Create a pool and verify the server is reachable
    pub async fn connect(config: DatabaseConfig) -> Result<Self, ConnectionError> {
        let pool = Self::new(config);
        pool.health_check().await?;
        tracing::info!("Database connection pool created successfully");
        Ok(pool)
    }

    /// Check out a connection, waiting while the pool is at its ceiling
    ///
    /// The wait is bounded by the configured `acquire_timeout`.
    pub async fn acquire(&self) -> Result<MySqlPooledConnection, ConnectionError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| acquire_error(e, self.config.acquire_timeout()))
    }

    /// Check out a connection, giving up after `wait`
    pub async fn acquire_timeout(&self, wait: Duration) -> Result<MySqlPooledConnection, ConnectionError> {
        match tokio::time::timeout(wait, self.pool.acquire()).await {
            Ok(result) => result.map_err(|e| acquire_error(e, wait)),
            Err(_) => Err(ConnectionError::Timeout { waited: wait }),
        }
    }

    /// Check if the database connection is healthy
    ///
    /// Performs a simple query to verify connectivity.
    ///
    /// # Returns
    /// * `Ok(true)` - The server answered `SELECT 1`
    /// * `Ok(false)` - The server answered something else
    /// * `Err(ConnectionError)` - No connection could be opened or used
    pub async fn health_check(&self) -> Result<bool, ConnectionError> {
        tracing::debug!("Performing database health check");

        let mut connection = self.acquire().await?;
        let result = sqlx::query("SELECT 1")
            .fetch_one(&mut *connection)
            .await
            .map_err(|e| {
                tracing::error!("Database health check failed: {}", e);
                ConnectionError::Broken { source: e.into() }
            })?;

        let value: i64 = result.try_get(0).unwrap_or(0);
        if value == 1 {
            tracing::debug!("Database health check passed");
            Ok(true)
        } else {
            tracing::warn!("Database health check returned unexpected value: {}", value);
            Ok(false)
        }
    }

    /// Get connection pool statistics
    pub fn statistics(&self) -> PoolStatistics {
        let open = self.pool.size();
        let idle = u32::try_from(self.pool.num_idle()).unwrap_or(open).min(open);
        PoolStatistics {
            open,
            idle,
            in_use: open - idle,
            max_open: self.config.max_open_connections.max(1),
        }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Close all connections in the pool
    ///
    /// Waits for lent connections to come back; further acquires fail with
    /// [`ConnectionError::PoolClosed`]. Call during application shutdown.
    pub async fn close(&self) {
        tracing::info!("Closing connection pool");
        self.pool.close().await;
        tracing::info!("Connection pool closed");
    }
}
