//! Domain entities and the trait that maps them onto tables.

pub mod entity;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use entity::{integer_field, string_field, timestamp_field, Entity};
pub use user::{User, UserStatus};
