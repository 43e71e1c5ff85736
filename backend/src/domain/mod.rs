//! Domain entities, value objects, ports, and marketplace services.
//!
//! Types here are transport and storage agnostic. Invariants live in the
//! value-object constructors (counts, coordinates, usernames) and in the
//! status enums' terminal state machines; the services sequence the
//! workflows over the [`ports::LedgerStore`] driven port.

pub mod credit;
pub mod error;
pub mod ledger_entry;
pub mod marketplace_service;
pub mod plantation;
pub mod ports;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::marketplace_service::{MarketplaceCommandService, MarketplaceQueryService};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
