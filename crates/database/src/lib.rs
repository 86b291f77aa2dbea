//! # Dugout Database Crate
//!
//! This crate owns persistence for stat records, player profiles and
//! subscriptions. It is the system's permanent record of what a player entered.
//!
//! ## Architectural Principles
//!
//! - **Adapter Behind a Trait:** Callers depend on `StatsStore`, never on SQL.
//!   `DbRepository` talks to PostgreSQL; `MemoryRepository` keeps everything in
//!   process for tests and local runs.
//! - **Append-Only Records:** Batting and pitching rows are inserted, never edited.
//!   Every read is scoped to a single user id.
//! - **Checked Boundaries:** Counters are unsigned in the domain and signed in
//!   Postgres. Both directions are converted with explicit range checks.
//!
//! ## Public API
//!
//! - `connect`: Establishes the database connection pool.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `StatsStore`: The storage interface used by the server and CLI.
//! - `DbRepository` / `MemoryRepository`: The two implementations.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::MemoryRepository;
pub use repository::DbRepository;
pub use store::StatsStore;
