//! In-memory [`LedgerStore`] for demo mode and tests.
//!
//! Backs the server when no `DATABASE_URL` is configured and the
//! integration tests, which exercise the full HTTP workflow without
//! PostgreSQL. The single mutex makes every compound transition one
//! critical section, giving the same exactly-one-winner guarantee the
//! Diesel adapter gets from conditional updates.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::credit::{Credit, CreditStatus};
use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::plantation::{Plantation, PlantationStatus};
use crate::domain::ports::{
    LedgerStore, LedgerStoreError, TransferCredit, TransferredCredit, VerifiedMint, VerifyAndMint,
};
use crate::domain::user::{Role, User};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    plantations: Vec<Plantation>,
    credits: Vec<Credit>,
    entries: Vec<LedgerEntry>,
}

/// Mutex-guarded in-memory implementation of the ledger store port.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Inner>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn create_user(&self, user: &User) -> Result<(), LedgerStoreError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(LedgerStoreError::query("username already exists"));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, LedgerStoreError> {
        Ok(self.lock().users.len() as u64)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, LedgerStoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_role(&self, role: Role) -> Result<Option<User>, LedgerStoreError> {
        Ok(self.lock().users.iter().find(|u| u.role == role).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, LedgerStoreError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create_plantation(&self, plantation: &Plantation) -> Result<(), LedgerStoreError> {
        self.lock().plantations.push(plantation.clone());
        Ok(())
    }

    async fn find_plantation(&self, id: Uuid) -> Result<Option<Plantation>, LedgerStoreError> {
        Ok(self
            .lock()
            .plantations
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn find_plantations(&self, ids: &[Uuid]) -> Result<Vec<Plantation>, LedgerStoreError> {
        Ok(self
            .lock()
            .plantations
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn plantations_by_ngo(&self, ngo_id: Uuid) -> Result<Vec<Plantation>, LedgerStoreError> {
        let matching: Vec<Plantation> = self
            .lock()
            .plantations
            .iter()
            .filter(|p| p.ngo_id == ngo_id)
            .cloned()
            .collect();
        Ok(newest_first(matching, |p| p.created_at))
    }

    async fn plantations_by_status(
        &self,
        status: PlantationStatus,
    ) -> Result<Vec<Plantation>, LedgerStoreError> {
        let matching: Vec<Plantation> = self
            .lock()
            .plantations
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        Ok(newest_first(matching, |p| p.created_at))
    }

    async fn find_credit(&self, id: Uuid) -> Result<Option<Credit>, LedgerStoreError> {
        Ok(self.lock().credits.iter().find(|c| c.id == id).cloned())
    }

    async fn credits_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credit>, LedgerStoreError> {
        let matching: Vec<Credit> = self
            .lock()
            .credits
            .iter()
            .filter(|c| c.current_owner_id == owner_id)
            .cloned()
            .collect();
        Ok(newest_first(matching, |c| c.created_at))
    }

    async fn credits_by_status(
        &self,
        status: CreditStatus,
    ) -> Result<Vec<Credit>, LedgerStoreError> {
        let matching: Vec<Credit> = self
            .lock()
            .credits
            .iter()
            .filter(|c| c.status == status)
            .cloned()
            .collect();
        Ok(newest_first(matching, |c| c.created_at))
    }

    async fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        Ok(newest_first(self.lock().entries.clone(), |e| e.created_at))
    }

    async fn ledger_entries_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let matching: Vec<LedgerEntry> = self
            .lock()
            .entries
            .iter()
            .filter(|e| e.from_user_id == Some(user_id) || e.to_user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(matching, |e| e.created_at))
    }

    async fn verify_and_mint(
        &self,
        command: VerifyAndMint,
    ) -> Result<VerifiedMint, LedgerStoreError> {
        let mut inner = self.lock();
        let plantation = inner
            .plantations
            .iter_mut()
            .find(|p| p.id == command.plantation_id)
            .ok_or(LedgerStoreError::not_found(
                "plantation",
                command.plantation_id,
            ))?;
        if plantation.status != PlantationStatus::Pending {
            return Err(LedgerStoreError::invalid_transition(
                "plantation has already been decided",
            ));
        }

        plantation.status = PlantationStatus::Verified;
        plantation.verified_at = Some(chrono::Utc::now());
        plantation.verified_by = Some(command.verified_by);
        let plantation = plantation.clone();

        let credit = Credit::mint(&plantation, command.price_per_credit);
        let entry = LedgerEntry::mint(&credit);
        inner.credits.push(credit.clone());
        inner.entries.push(entry.clone());

        Ok(VerifiedMint {
            plantation,
            credit,
            entry,
        })
    }

    async fn reject_plantation(
        &self,
        plantation_id: Uuid,
    ) -> Result<Plantation, LedgerStoreError> {
        let mut inner = self.lock();
        let plantation = inner
            .plantations
            .iter_mut()
            .find(|p| p.id == plantation_id)
            .ok_or(LedgerStoreError::not_found("plantation", plantation_id))?;
        if plantation.status != PlantationStatus::Pending {
            return Err(LedgerStoreError::invalid_transition(
                "plantation has already been decided",
            ));
        }
        plantation.status = PlantationStatus::Rejected;
        Ok(plantation.clone())
    }

    async fn transfer_credit(
        &self,
        command: TransferCredit,
    ) -> Result<TransferredCredit, LedgerStoreError> {
        let mut inner = self.lock();
        let credit = inner
            .credits
            .iter_mut()
            .find(|c| c.id == command.credit_id)
            .ok_or(LedgerStoreError::not_found("credit", command.credit_id))?;
        if credit.status != CreditStatus::Available {
            return Err(LedgerStoreError::invalid_transition(
                "credit is not available for purchase",
            ));
        }

        let previous_owner_id = credit.current_owner_id;
        credit.current_owner_id = command.buyer_id;
        credit.status = CreditStatus::Sold;
        let credit = credit.clone();

        let entry = LedgerEntry::transfer(&credit, previous_owner_id);
        inner.entries.push(entry.clone());

        Ok(TransferredCredit { credit, entry })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::credit::default_price_per_credit;
    use crate::domain::plantation::{GeoPoint, MangroveCount, PlantationDraft};
    use crate::domain::user::Username;

    fn store_with_pending(mangrove_count: i32) -> (MemoryLedgerStore, Plantation) {
        let store = MemoryLedgerStore::new();
        let plantation = Plantation::submit(PlantationDraft {
            ngo_id: Uuid::new_v4(),
            mangrove_count: MangroveCount::new(mangrove_count).expect("valid count"),
            location: GeoPoint::new(Decimal::new(13521, 4), Decimal::new(1038198, 4))
                .expect("valid coordinates"),
            notes: None,
            image_url: None,
        });
        store
            .lock()
            .plantations
            .push(plantation.clone());
        (store, plantation)
    }

    #[tokio::test]
    async fn verify_mints_credit_and_entry_once() {
        let (store, plantation) = store_with_pending(250);
        let verifier = Uuid::new_v4();

        let minted = store
            .verify_and_mint(VerifyAndMint {
                plantation_id: plantation.id,
                verified_by: verifier,
                price_per_credit: default_price_per_credit(),
            })
            .await
            .expect("verification succeeds");

        assert_eq!(minted.plantation.status, PlantationStatus::Verified);
        assert_eq!(minted.plantation.verified_by, Some(verifier));
        assert_eq!(minted.credit.amount, 2);
        assert!(minted.entry.from_user_id.is_none());

        let err = store
            .verify_and_mint(VerifyAndMint {
                plantation_id: plantation.id,
                verified_by: verifier,
                price_per_credit: default_price_per_credit(),
            })
            .await
            .expect_err("second verification must fail");
        assert!(matches!(err, LedgerStoreError::InvalidTransition { .. }));

        // Exactly one credit and one entry exist after the failed re-verify.
        assert_eq!(store.lock().credits.len(), 1);
        assert_eq!(store.lock().entries.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_purchases_admit_exactly_one_winner() {
        let (store, plantation) = store_with_pending(500);
        let minted = store
            .verify_and_mint(VerifyAndMint {
                plantation_id: plantation.id,
                verified_by: Uuid::new_v4(),
                price_per_credit: default_price_per_credit(),
            })
            .await
            .expect("verification succeeds");

        let first_buyer = Uuid::new_v4();
        let second_buyer = Uuid::new_v4();
        let (first, second) = tokio::join!(
            store.transfer_credit(TransferCredit {
                credit_id: minted.credit.id,
                buyer_id: first_buyer,
            }),
            store.transfer_credit(TransferCredit {
                credit_id: minted.credit.id,
                buyer_id: second_buyer,
            }),
        );

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let loser = if first.is_ok() { second } else { first };
        assert!(matches!(
            loser.expect_err("loser observes invalid state"),
            LedgerStoreError::InvalidTransition { .. },
        ));
        // One transfer entry beside the mint.
        assert_eq!(store.lock().entries.len(), 2);
    }

    #[tokio::test]
    async fn reject_is_terminal() {
        let (store, plantation) = store_with_pending(50);
        let rejected = store
            .reject_plantation(plantation.id)
            .await
            .expect("rejection succeeds");
        assert_eq!(rejected.status, PlantationStatus::Rejected);
        assert!(store.lock().credits.is_empty());
        assert!(store.lock().entries.is_empty());

        let err = store
            .verify_and_mint(VerifyAndMint {
                plantation_id: plantation.id,
                verified_by: Uuid::new_v4(),
                price_per_credit: default_price_per_credit(),
            })
            .await
            .expect_err("verifying a rejected claim must fail");
        assert!(matches!(err, LedgerStoreError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn transfer_of_missing_credit_is_not_found() {
        let store = MemoryLedgerStore::new();
        let err = store
            .transfer_credit(TransferCredit {
                credit_id: Uuid::new_v4(),
                buyer_id: Uuid::new_v4(),
            })
            .await
            .expect_err("missing credit must fail");
        assert!(matches!(err, LedgerStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryLedgerStore::new();
        let user = User::new(
            Username::new("admin").expect("valid username"),
            Role::Admin,
            None,
        );
        store.create_user(&user).await.expect("first insert succeeds");

        let duplicate = User::new(
            Username::new("admin").expect("valid username"),
            Role::Admin,
            None,
        );
        assert!(store.create_user(&duplicate).await.is_err());
    }
}
