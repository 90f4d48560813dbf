//! Error taxonomy of the data-access layer.
//!
//! Every error is returned to the immediate caller; nothing here is retried.
//! [`DataError`] is the umbrella type the CRUD facade returns, with one
//! variant per failure class so callers can tell business absence
//! ([`DataError::NotFound`]) apart from infrastructure faults.

use std::fmt;
use std::time::Duration;

use mc_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

use crate::domain::FieldType;

/// Boxed underlying cause (a driver error in practice)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Kind of database operation, carried in error context and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    Introspect,
    CreateTable,
    AlterTable,
    Insert,
    Select,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Connect => "connect",
            Operation::Introspect => "introspect",
            Operation::CreateTable => "create table",
            Operation::AlterTable => "alter table",
            Operation::Insert => "insert",
            Operation::Select => "select",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// The pool could not hand out a healthy connection
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to open database connection: {source}")]
    Open {
        #[source]
        source: BoxError,
    },

    #[error("Database connection is broken: {source}")]
    Broken {
        #[source]
        source: BoxError,
    },

    #[error("Timed out after {waited:?} waiting for a pooled connection")]
    Timeout { waited: Duration },

    #[error("Connection pool is closed")]
    PoolClosed,
}

/// Table creation or reconciliation failed
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid definition for entity '{entity}': {reason}")]
    InvalidDefinition { entity: String, reason: String },

    #[error("Schema synchronization of '{entity}' failed during {operation}: {source}")]
    Database {
        entity: String,
        operation: Operation,
        #[source]
        source: BoxError,
    },
}

/// A statement could not be built or failed to execute
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Unknown column '{column}' for entity '{entity}'")]
    UnknownColumn { entity: String, column: String },

    #[error("{operation} on '{entity}' has no columns to write")]
    NoColumns { entity: String, operation: Operation },

    #[error("{operation} on '{entity}' failed: {source}")]
    Database {
        entity: String,
        operation: Operation,
        #[source]
        source: BoxError,
    },
}

impl ExecError {
    /// Wrap a driver error with entity and operation context
    pub fn database(
        entity: impl Into<String>,
        operation: Operation,
        source: impl Into<BoxError>,
    ) -> Self {
        ExecError::Database {
            entity: entity.into(),
            operation,
            source: source.into(),
        }
    }
}

/// A row does not match the entity definition it is decoded with
#[derive(Error, Debug)]
pub enum MappingError {
    #[error("Entity '{entity}' declares {expected} fields but the row has {actual} columns")]
    ColumnCount {
        entity: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{field}' of '{entity}' expects {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    #[error("Field '{field}' is not declared by entity '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("Field '{field}' of '{entity}' is missing")]
    MissingField { entity: String, field: String },

    #[error("Field '{field}' of '{entity}' holds an invalid value: {reason}")]
    InvalidValue {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("Column '{field}' of '{entity}' could not be read: {source}")]
    Decode {
        entity: String,
        field: String,
        #[source]
        source: BoxError,
    },
}

/// Umbrella error returned by the CRUD facade
#[derive(Error, Debug)]
pub enum DataError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: String, id: i64 },

    #[error("Invalid {entity}: {message}")]
    Validation { entity: String, message: String },
}

impl DataError {
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        DataError::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn validation(entity: impl Into<String>, message: impl Into<String>) -> Self {
        DataError::Validation {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Business-level absence, not a fault
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataError::NotFound { .. })
    }

    /// Faults of the database or the pool rather than of the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            DataError::Connection(_)
                | DataError::Schema(SchemaError::Database { .. })
                | DataError::Exec(ExecError::Database { .. })
        )
    }
}

impl IntoErrorResponse for DataError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            DataError::NotFound { entity, id } => {
                ErrorResponse::new(error_codes::NOT_FOUND, self.to_string())
                    .add_detail("entity", entity)
                    .add_detail("id", id)
            }
            DataError::Validation { .. } => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, self.to_string())
            }
            DataError::Connection(_) => ErrorResponse::new(
                error_codes::DATABASE_UNAVAILABLE,
                "The database is currently unavailable",
            ),
            DataError::Schema(_) => {
                ErrorResponse::new(error_codes::SCHEMA_ERROR, "Schema synchronization failed")
            }
            DataError::Mapping(_) => {
                ErrorResponse::new(error_codes::MAPPING_ERROR, "Stored data could not be mapped")
            }
            DataError::Exec(ExecError::Database { .. }) => {
                ErrorResponse::new(error_codes::DATABASE_ERROR, "A database statement failed")
            }
            DataError::Exec(_) => ErrorResponse::new(error_codes::BAD_REQUEST, self.to_string()),
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
