//! Database module
//!
//! This module handles database connections and storage backends

pub mod connection;
pub mod backend;
pub mod postgres;
pub mod memory;

// Re-export commonly used database components
pub use connection::{DatabasePool, PoolConfig, create_pool, run_migrations, health_check};
pub use backend::EventStorage;
pub use postgres::PostgresEventStore;
pub use memory::MemoryEventStore;
