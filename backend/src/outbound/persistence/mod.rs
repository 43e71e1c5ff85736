//! Persistence adapters for the ledger store port.
//!
//! [`DieselLedgerStore`] is the PostgreSQL adapter used in deployments; the
//! SQL schema lives in the crate's `migrations/` directory and is applied
//! with the Diesel CLI. [`MemoryLedgerStore`] backs demo mode (no
//! `DATABASE_URL`) and the integration tests.

pub mod diesel_ledger_store;
pub mod memory_ledger_store;
mod models;
pub mod pool;
mod schema;

pub use diesel_ledger_store::DieselLedgerStore;
pub use memory_ledger_store::MemoryLedgerStore;
pub use pool::{DbPool, PoolConfig, PoolError};
