//! Clinica Database — SurrealDB connection management, schema
//! migrations, repository implementations, and the allocation ledger.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations for the `clinica-core` traits
//! - [`SurrealAllocationLedger`], the transactional slot/bed ledger

mod connection;
mod error;
mod ledger;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use ledger::SurrealAllocationLedger;
pub use schema::{run_migrations, schema_v1};
