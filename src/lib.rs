//! JoinMy Community Event Store
//!
//! A library for discovering and joining local community events. It owns the
//! authoritative event collection and per-user enrollment records, enforces
//! the capacity invariant on joins, and persists through a swappable storage
//! backend (Postgres or in-memory). Map rendering and user interaction are
//! left to the hosting presentation layer.

#![allow(non_snake_case)]

pub mod config;
pub mod models;
pub mod database;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{JoinMyError, Result};

// Re-export main components for easy access
pub use database::{EventStorage, MemoryEventStore, PostgresEventStore};
pub use models::{Event, Enrollment, Coordinates, CreateEventRequest};
pub use services::{EventService, GeoService, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
