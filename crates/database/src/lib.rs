//! # Tradebook Database Crate
//!
//! The journal's durable storage: a plain key-value interface where each key holds
//! one JSON document.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** Encapsulates every storage-specific detail (files, SQL)
//!   behind the `KeyValueStore` trait. The journal never knows which backend it has.
//! - **Swappable Backends:** `FileStore` for a local single-user install,
//!   `MemoryStore` for tests and throwaway sessions, `PgStore` for a shared database.
//! - **Asynchronous:** All operations are `async` and safe to share across tasks.
//!
//! ## Public API
//!
//! - `KeyValueStore`: the storage trait.
//! - `FileStore`, `MemoryStore`, `PgStore`: the backends.
//! - `open_store`: builds the backend selected in the configuration.
//! - `connect` / `run_migrations`: PostgreSQL pool and schema setup.
//! - `DbError`: the errors this crate can return.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, open_store, run_migrations};
pub use error::DbError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use repository::PgStore;
pub use store::KeyValueStore;
