//! Driving port for marketplace state transitions.
//!
//! Sequences the submit, verify/reject, and purchase workflows over the
//! ledger store. Implementations own input validation and the mapping of
//! store failures onto the domain [`Error`] taxonomy.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::credit::Credit;
use crate::domain::error::Error;
use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::plantation::Plantation;

/// Inputs for a plantation submission.
///
/// Field-level invariants (count bounds, coordinate ranges) are enforced by
/// the implementation; callers pass raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitPlantationRequest {
    pub ngo_id: Uuid,
    pub mangrove_count: i32,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// Inputs for verifying a pending plantation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyPlantationRequest {
    pub plantation_id: Uuid,
    pub verified_by: Uuid,
}

/// Records written by a successful verification.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPlantationOutcome {
    /// The plantation, now `verified`.
    pub plantation: Plantation,
    /// The freshly minted credit block.
    pub credit: Credit,
    /// The mint entry appended to the ledger.
    pub transaction: LedgerEntry,
}

/// Inputs for purchasing an available credit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseCreditRequest {
    pub credit_id: Uuid,
    pub buyer_id: Uuid,
}

/// Records written by a successful purchase.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreditOutcome {
    /// The credit block, now `sold` and owned by the buyer.
    pub credit: Credit,
    /// The transfer entry appended to the ledger.
    pub transaction: LedgerEntry,
}

/// Driving port for marketplace write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceCommand: Send + Sync {
    /// Record a new plantation claim as `pending`.
    ///
    /// Computes the accrued credit amount once at submission; no credit or
    /// ledger entry is written until verification.
    async fn submit_plantation(
        &self,
        request: SubmitPlantationRequest,
    ) -> Result<Plantation, Error>;

    /// Verify a pending plantation: flip it to `verified`, mint its credit
    /// block, and append the mint entry, atomically.
    ///
    /// Returns [`crate::domain::ErrorCode::Conflict`] when the plantation
    /// has already been decided.
    async fn verify_plantation(
        &self,
        request: VerifyPlantationRequest,
    ) -> Result<VerifyPlantationOutcome, Error>;

    /// Reject a pending plantation. Terminal; writes no credit or entry.
    async fn reject_plantation(&self, plantation_id: Uuid) -> Result<Plantation, Error>;

    /// Purchase an available credit block in full: reassign ownership, flip
    /// to `sold`, and append the transfer entry, atomically.
    ///
    /// Returns [`crate::domain::ErrorCode::Conflict`] when the block is no
    /// longer available.
    async fn purchase_credit(
        &self,
        request: PurchaseCreditRequest,
    ) -> Result<PurchaseCreditOutcome, Error>;
}
