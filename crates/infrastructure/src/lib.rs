//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod database;
mod in_memory_lock_store;
mod postgres_lock_store;
mod system_clock;

pub use database::{DatabaseConfig, PoolConfig, connect_and_migrate, storage_error};
pub use in_memory_lock_store::InMemoryLockStore;
pub use postgres_lock_store::PostgresLockStore;
pub use system_clock::SystemClock;
