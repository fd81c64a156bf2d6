//! # Stockfolio Database Crate
//!
//! Persistence of clients and their holdings. The rest of the system talks to
//! the `HoldingsStore` trait and never sees SQL.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all database-specific logic lives here, behind a trait that
//!   also has an in-memory implementation for tests and embedding.
//! - **Asynchronous & Pooled:** the PostgreSQL implementation uses a shared
//!   `PgPool`; multi-row writes run inside transactions.
//!
//! ## Public API
//!
//! - `HoldingsStore`: the async persistence seam.
//! - `DbRepository`: PostgreSQL implementation over a `PgPool`.
//! - `InMemoryStore`: lock-guarded implementation for tests and embedding.
//! - `connect` / `run_migrations`: pool construction and schema setup.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_to, run_migrations};
pub use error::DbError;
pub use memory::InMemoryStore;
pub use repository::{DbHolding, DbRepository};
pub use store::HoldingsStore;
