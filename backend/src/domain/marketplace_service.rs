//! Marketplace services implementing the driving ports.
//!
//! [`MarketplaceCommandService`] sequences the write workflows (submit,
//! verify/reject, purchase) over the ledger store; the store applies each
//! multi-record transition atomically and guards it with a status
//! precondition. [`MarketplaceQueryService`] serves reads, batch-fetching
//! related rows by id set for the enriched projections instead of issuing
//! per-row lookups.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::domain::credit::{Credit, CreditStatus, default_price_per_credit};
use crate::domain::error::Error;
use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::plantation::{
    GeoPoint, MangroveCount, Plantation, PlantationDraft, PlantationStatus,
    PlantationValidationError,
};
use crate::domain::ports::{
    CreditListing, LedgerEntryView, LedgerStore, LedgerStoreError, MarketplaceCommand,
    MarketplaceQuery, MarketplaceStats, NgoSummary, PlantationSummary, PurchaseCreditOutcome,
    PurchaseCreditRequest, SubmitPlantationRequest, TransferCredit, UserSummary,
    VerifyAndMint, VerifyPlantationOutcome, VerifyPlantationRequest,
};
use crate::domain::user::{Role, User};

fn map_store_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerStoreError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
        LedgerStoreError::NotFound { entity, id } => {
            Error::not_found(format!("{entity} {id} not found"))
        }
        LedgerStoreError::InvalidTransition { message } => Error::conflict(message),
    }
}

fn map_validation_error(error: PlantationValidationError) -> Error {
    let field = match error {
        PlantationValidationError::MangroveCountOutOfRange { .. } => "mangroveCount",
        PlantationValidationError::LatitudeOutOfRange => "latitude",
        PlantationValidationError::LongitudeOutOfRange => "longitude",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

/// Marketplace service implementing the command driving port.
#[derive(Clone)]
pub struct MarketplaceCommandService<S> {
    store: Arc<S>,
}

impl<S> MarketplaceCommandService<S> {
    /// Create a new command service over the given ledger store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> MarketplaceCommand for MarketplaceCommandService<S>
where
    S: LedgerStore,
{
    async fn submit_plantation(
        &self,
        request: SubmitPlantationRequest,
    ) -> Result<Plantation, Error> {
        let mangrove_count =
            MangroveCount::new(request.mangrove_count).map_err(map_validation_error)?;
        let location =
            GeoPoint::new(request.latitude, request.longitude).map_err(map_validation_error)?;

        let plantation = Plantation::submit(PlantationDraft {
            ngo_id: request.ngo_id,
            mangrove_count,
            location,
            notes: request.notes,
            image_url: request.image_url,
        });

        self.store
            .create_plantation(&plantation)
            .await
            .map_err(map_store_error)?;

        Ok(plantation)
    }

    async fn verify_plantation(
        &self,
        request: VerifyPlantationRequest,
    ) -> Result<VerifyPlantationOutcome, Error> {
        let minted = self
            .store
            .verify_and_mint(VerifyAndMint {
                plantation_id: request.plantation_id,
                verified_by: request.verified_by,
                price_per_credit: default_price_per_credit(),
            })
            .await
            .map_err(map_store_error)?;

        Ok(VerifyPlantationOutcome {
            plantation: minted.plantation,
            credit: minted.credit,
            transaction: minted.entry,
        })
    }

    async fn reject_plantation(&self, plantation_id: Uuid) -> Result<Plantation, Error> {
        self.store
            .reject_plantation(plantation_id)
            .await
            .map_err(map_store_error)
    }

    async fn purchase_credit(
        &self,
        request: PurchaseCreditRequest,
    ) -> Result<PurchaseCreditOutcome, Error> {
        let transferred = self
            .store
            .transfer_credit(TransferCredit {
                credit_id: request.credit_id,
                buyer_id: request.buyer_id,
            })
            .await
            .map_err(map_store_error)?;

        Ok(PurchaseCreditOutcome {
            credit: transferred.credit,
            transaction: transferred.entry,
        })
    }
}

/// Marketplace service implementing the query driving port.
#[derive(Clone)]
pub struct MarketplaceQueryService<S> {
    store: Arc<S>,
}

impl<S> MarketplaceQueryService<S> {
    /// Create a new query service over the given ledger store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> MarketplaceQueryService<S>
where
    S: LedgerStore,
{
    async fn users_by_id(&self, ids: BTreeSet<Uuid>) -> Result<HashMap<Uuid, User>, Error> {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        let users = self
            .store
            .find_users(&ids)
            .await
            .map_err(map_store_error)?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    async fn plantations_by_id(
        &self,
        ids: BTreeSet<Uuid>,
    ) -> Result<HashMap<Uuid, Plantation>, Error> {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        let plantations = self
            .store
            .find_plantations(&ids)
            .await
            .map_err(map_store_error)?;
        Ok(plantations
            .into_iter()
            .map(|plantation| (plantation.id, plantation))
            .collect())
    }
}

#[async_trait]
impl<S> MarketplaceQuery for MarketplaceQueryService<S>
where
    S: LedgerStore,
{
    async fn login(&self, role: Role) -> Result<User, Error> {
        self.store
            .find_user_by_role(role)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("no {role} user is available")))
    }

    async fn user(&self, user_id: Uuid) -> Result<User, Error> {
        self.store
            .find_user(user_id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }

    async fn plantations_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<Plantation>, Error> {
        self.store
            .plantations_by_ngo(ngo_id)
            .await
            .map_err(map_store_error)
    }

    async fn pending_plantations(&self) -> Result<Vec<Plantation>, Error> {
        self.store
            .plantations_by_status(PlantationStatus::Pending)
            .await
            .map_err(map_store_error)
    }

    async fn available_credits(&self) -> Result<Vec<CreditListing>, Error> {
        let credits = self
            .store
            .credits_by_status(CreditStatus::Available)
            .await
            .map_err(map_store_error)?;

        let ngo_ids: BTreeSet<Uuid> = credits.iter().map(|credit| credit.ngo_id).collect();
        let plantation_ids: BTreeSet<Uuid> =
            credits.iter().map(|credit| credit.plantation_id).collect();

        let ngos = self.users_by_id(ngo_ids).await?;
        let plantations = self.plantations_by_id(plantation_ids).await?;

        Ok(credits
            .into_iter()
            .map(|credit| {
                let ngo = ngos.get(&credit.ngo_id).map(NgoSummary::from);
                let plantation = plantations
                    .get(&credit.plantation_id)
                    .map(PlantationSummary::from);
                CreditListing {
                    credit,
                    ngo,
                    plantation,
                }
            })
            .collect())
    }

    async fn credits_for_owner(&self, owner_id: Uuid) -> Result<Vec<Credit>, Error> {
        self.store
            .credits_by_owner(owner_id)
            .await
            .map_err(map_store_error)
    }

    async fn ledger(&self) -> Result<Vec<LedgerEntryView>, Error> {
        let entries = self
            .store
            .ledger_entries()
            .await
            .map_err(map_store_error)?;

        let user_ids: BTreeSet<Uuid> = entries
            .iter()
            .flat_map(|entry| entry.from_user_id.into_iter().chain(Some(entry.to_user_id)))
            .collect();
        let users = self.users_by_id(user_ids).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let from_user = entry
                    .from_user_id
                    .and_then(|id| users.get(&id))
                    .map(UserSummary::from);
                let to_user = users.get(&entry.to_user_id).map(UserSummary::from);
                LedgerEntryView {
                    entry,
                    from_user,
                    to_user,
                }
            })
            .collect())
    }

    async fn ledger_for_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, Error> {
        self.store
            .ledger_entries_for_user(user_id)
            .await
            .map_err(map_store_error)
    }

    async fn stats(&self) -> Result<MarketplaceStats, Error> {
        let entries = self
            .store
            .ledger_entries()
            .await
            .map_err(map_store_error)?;
        let available = self
            .store
            .credits_by_status(CreditStatus::Available)
            .await
            .map_err(map_store_error)?;

        Ok(MarketplaceStats {
            total_transactions: entries.len() as u64,
            total_credits_issued: available.iter().map(|credit| i64::from(credit.amount)).sum(),
            available_credits: available.len() as u64,
        })
    }
}

#[cfg(test)]
#[path = "marketplace_service_tests.rs"]
mod tests;
