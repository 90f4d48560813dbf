//! HTTP layer: user CRUD endpoints over the data-access layer
//!
//! The library exposes the application factory so integration tests can
//! drive it against an in-memory store.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
