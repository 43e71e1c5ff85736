//! Driving port for marketplace reads and enriched projections.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::credit::Credit;
use crate::domain::error::Error;
use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::plantation::{MangroveCount, Plantation};
use crate::domain::user::{Role, User};

/// NGO attribution attached to marketplace credit listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NgoSummary {
    pub id: Uuid,
    pub organization_name: Option<String>,
}

impl From<&User> for NgoSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            organization_name: user.organization_name.clone(),
        }
    }
}

/// Plantation provenance attached to marketplace credit listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantationSummary {
    #[schema(value_type = String, example = "1.3521")]
    pub latitude: Decimal,
    #[schema(value_type = String, example = "103.8198")]
    pub longitude: Decimal,
    #[schema(value_type = i32, example = 500)]
    pub mangrove_count: MangroveCount,
    pub notes: Option<String>,
}

impl From<&Plantation> for PlantationSummary {
    fn from(plantation: &Plantation) -> Self {
        Self {
            latitude: plantation.location.latitude,
            longitude: plantation.location.longitude,
            mangrove_count: plantation.mangrove_count,
            notes: plantation.notes.clone(),
        }
    }
}

/// Party attribution attached to ledger views.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub organization_name: Option<String>,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            organization_name: user.organization_name.clone(),
            role: user.role,
        }
    }
}

/// An available credit block enriched for the marketplace page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditListing {
    /// The credit block itself, flattened into the listing.
    #[serde(flatten)]
    pub credit: Credit,
    /// Originating NGO, when still present in the store.
    pub ngo: Option<NgoSummary>,
    /// Source plantation, when still present in the store.
    pub plantation: Option<PlantationSummary>,
}

/// A ledger entry enriched with party attribution for display.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryView {
    /// The entry itself, flattened into the view.
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// Sending party; absent for mint events.
    pub from_user: Option<UserSummary>,
    /// Receiving party.
    pub to_user: Option<UserSummary>,
}

/// Aggregate counters for the dashboard header.
///
/// `total_credits_issued` reports the credit amount currently listed as
/// available, not the cumulative minted supply; the name is kept for wire
/// compatibility with existing dashboard clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceStats {
    pub total_transactions: u64,
    pub total_credits_issued: i64,
    pub available_credits: u64,
}

/// Driving port for marketplace read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceQuery: Send + Sync {
    /// Resolve the demo login user for a role.
    async fn login(&self, role: Role) -> Result<User, Error>;

    /// Fetch a user by id.
    async fn user(&self, user_id: Uuid) -> Result<User, Error>;

    /// List an NGO's plantations, newest first.
    async fn plantations_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<Plantation>, Error>;

    /// List the admin verification queue, newest first.
    async fn pending_plantations(&self) -> Result<Vec<Plantation>, Error>;

    /// List available credit blocks enriched with NGO and plantation
    /// attribution, newest first.
    async fn available_credits(&self) -> Result<Vec<CreditListing>, Error>;

    /// List credit blocks owned by a user, newest first.
    async fn credits_for_owner(&self, owner_id: Uuid) -> Result<Vec<Credit>, Error>;

    /// Read the full ledger enriched with party attribution, newest first.
    async fn ledger(&self) -> Result<Vec<LedgerEntryView>, Error>;

    /// Read a user's ledger history (entries sent or received).
    async fn ledger_for_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, Error>;

    /// Aggregate dashboard counters.
    async fn stats(&self) -> Result<MarketplaceStats, Error>;
}
