//! # MyCrud Core
//!
//! Storage-neutral half of the data-access layer: entity definitions,
//! values and records, the row mapper, the error taxonomy and the CRUD
//! facade contract. Nothing here talks to a database; the MySQL
//! implementation lives in `mc_infra`.

pub mod domain;
pub mod errors;
pub mod mapping;
pub mod repositories;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use mapping::RowMapper;
pub use repositories::*;
