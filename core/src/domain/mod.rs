//! Domain layer: entity definitions, column values and typed entities.

pub mod definition;
pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use definition::{is_valid_identifier, EntityDefinition, FieldDef, FieldType};
pub use entities::*;
pub use value_objects::*;
