//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{MarketplaceCommand, MarketplaceQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Marketplace write workflows.
    pub commands: Arc<dyn MarketplaceCommand>,
    /// Marketplace reads and enriched projections.
    pub queries: Arc<dyn MarketplaceQuery>,
}

impl HttpState {
    /// Construct state from the driving port implementations.
    pub fn new(commands: Arc<dyn MarketplaceCommand>, queries: Arc<dyn MarketplaceQuery>) -> Self {
        Self { commands, queries }
    }
}
