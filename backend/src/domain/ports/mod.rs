//! Driving and driven ports for the marketplace.
//!
//! Driving ports ([`MarketplaceCommand`], [`MarketplaceQuery`]) are the
//! use-case interfaces consumed by inbound adapters. The driven port
//! ([`LedgerStore`]) is the persistence boundary implemented by outbound
//! adapters.

pub mod ledger_store;
pub mod marketplace_command;
pub mod marketplace_query;

pub use self::ledger_store::{
    LedgerStore, LedgerStoreError, TransferCredit, TransferredCredit, VerifiedMint, VerifyAndMint,
};
pub use self::marketplace_command::{
    MarketplaceCommand, PurchaseCreditOutcome, PurchaseCreditRequest, SubmitPlantationRequest,
    VerifyPlantationOutcome, VerifyPlantationRequest,
};
pub use self::marketplace_query::{
    CreditListing, LedgerEntryView, MarketplaceQuery, MarketplaceStats, NgoSummary,
    PlantationSummary, UserSummary,
};

#[cfg(test)]
pub use self::ledger_store::MockLedgerStore;
#[cfg(test)]
pub use self::marketplace_command::MockMarketplaceCommand;
#[cfg(test)]
pub use self::marketplace_query::MockMarketplaceQuery;
