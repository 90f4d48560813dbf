//! Value objects representing immutable domain concepts.

pub mod record;
pub mod value;

// Re-export commonly used types
pub use record::Record;
pub use value::{Row, Value};
