//! EcoLedger backend library.
//!
//! A marketplace connecting NGOs that plant mangroves with buyers of carbon
//! credits, with an admin role verifying submissions. The crate is laid out
//! hexagonally: `domain` holds the entities, ports, and services; `inbound`
//! adapts HTTP onto the driving ports; `outbound` implements the ledger
//! store against PostgreSQL and in memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seed;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::trace::{Trace, TraceId};
