//! Driven port for marketplace persistence.
//!
//! The store exposes per-entity lookups and list reads plus three compound
//! status transitions. Each compound transition must be applied atomically
//! by the adapter (one database transaction, or one critical section for the
//! in-memory adapter) and must guard the transition with a precondition on
//! the current status, so repeated or racing calls cannot mint duplicate
//! credits or sell a block twice.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::credit::{Credit, CreditStatus};
use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::plantation::{Plantation, PlantationStatus};
use crate::domain::user::{Role, User};

/// Errors raised by ledger store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerStoreError {
    /// Store connection could not be established.
    #[error("ledger store connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("ledger store query failed: {message}")]
    Query { message: String },

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The entity is not in the state the transition requires.
    #[error("{message}")]
    InvalidTransition { message: String },
}

impl LedgerStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given entity.
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create an invalid-transition error with the given message.
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: message.into(),
        }
    }
}

/// Inputs for the verify-and-mint transition.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyAndMint {
    pub plantation_id: Uuid,
    pub verified_by: Uuid,
    pub price_per_credit: Decimal,
}

/// Result of a successful verify-and-mint transition.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedMint {
    pub plantation: Plantation,
    pub credit: Credit,
    pub entry: LedgerEntry,
}

/// Inputs for the purchase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCredit {
    pub credit_id: Uuid,
    pub buyer_id: Uuid,
}

/// Result of a successful purchase transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferredCredit {
    pub credit: Credit,
    pub entry: LedgerEntry,
}

/// Persistence boundary for users, plantations, credits, and the ledger.
///
/// List reads are ordered by creation time descending for display.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist a new user. Only the seed bootstrap creates users.
    async fn create_user(&self, user: &User) -> Result<(), LedgerStoreError>;

    /// Count stored users; the seed bootstrap uses this as its idempotency
    /// guard.
    async fn count_users(&self) -> Result<u64, LedgerStoreError>;

    /// Find a user by id.
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, LedgerStoreError>;

    /// Find the demo login user for a role.
    async fn find_user_by_role(&self, role: Role) -> Result<Option<User>, LedgerStoreError>;

    /// Batch-fetch users by id set; used by enrichment.
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, LedgerStoreError>;

    /// Persist a newly submitted plantation.
    async fn create_plantation(&self, plantation: &Plantation) -> Result<(), LedgerStoreError>;

    /// Find a plantation by id.
    async fn find_plantation(&self, id: Uuid) -> Result<Option<Plantation>, LedgerStoreError>;

    /// Batch-fetch plantations by id set; used by enrichment.
    async fn find_plantations(&self, ids: &[Uuid]) -> Result<Vec<Plantation>, LedgerStoreError>;

    /// List an NGO's plantations.
    async fn plantations_by_ngo(&self, ngo_id: Uuid) -> Result<Vec<Plantation>, LedgerStoreError>;

    /// List plantations in the given state; `pending` feeds the admin queue.
    async fn plantations_by_status(
        &self,
        status: PlantationStatus,
    ) -> Result<Vec<Plantation>, LedgerStoreError>;

    /// Find a credit block by id.
    async fn find_credit(&self, id: Uuid) -> Result<Option<Credit>, LedgerStoreError>;

    /// List credit blocks owned by a user.
    async fn credits_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credit>, LedgerStoreError>;

    /// List credit blocks in the given state; `available` feeds the
    /// marketplace.
    async fn credits_by_status(
        &self,
        status: CreditStatus,
    ) -> Result<Vec<Credit>, LedgerStoreError>;

    /// Read the full ledger.
    async fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, LedgerStoreError>;

    /// Read ledger entries where the user is the source or the recipient.
    async fn ledger_entries_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError>;

    /// Atomically verify a pending plantation, mint its credit block, and
    /// append the mint entry.
    ///
    /// Fails with [`LedgerStoreError::NotFound`] when the plantation does
    /// not exist and [`LedgerStoreError::InvalidTransition`] when it is no
    /// longer pending; neither failure leaves partial state behind.
    async fn verify_and_mint(
        &self,
        command: VerifyAndMint,
    ) -> Result<VerifiedMint, LedgerStoreError>;

    /// Reject a pending plantation. No credit or ledger entry is written.
    ///
    /// Same failure contract as [`LedgerStore::verify_and_mint`].
    async fn reject_plantation(&self, plantation_id: Uuid)
    -> Result<Plantation, LedgerStoreError>;

    /// Atomically transfer an available credit block to the buyer, flip it
    /// to `sold`, and append the transfer entry.
    ///
    /// Fails with [`LedgerStoreError::NotFound`] when the credit does not
    /// exist and [`LedgerStoreError::InvalidTransition`] when it is not
    /// available; of two racing calls exactly one succeeds.
    async fn transfer_credit(
        &self,
        command: TransferCredit,
    ) -> Result<TransferredCredit, LedgerStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_constructors_format_messages() {
        let id = Uuid::nil();
        assert_eq!(
            LedgerStoreError::not_found("plantation", id).to_string(),
            format!("plantation {id} not found"),
        );
        assert_eq!(
            LedgerStoreError::invalid_transition("credit is not available").to_string(),
            "credit is not available",
        );
        assert!(
            LedgerStoreError::connection("refused")
                .to_string()
                .contains("refused")
        );
        assert!(
            LedgerStoreError::query("broken sql")
                .to_string()
                .contains("broken sql")
        );
    }
}
