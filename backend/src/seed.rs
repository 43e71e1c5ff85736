//! Demo data bootstrap.
//!
//! Seeds the three demo users and one sample verified plantation on first
//! start. The sample submission runs through the real marketplace workflow,
//! so the minted credit block and mint entry satisfy the same invariants as
//! live data. A store that already contains users is left untouched.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::Error;
use crate::domain::ports::{
    LedgerStore, MarketplaceCommand, SubmitPlantationRequest, VerifyPlantationRequest,
};
use crate::domain::user::{Role, User, Username};

/// Outcome of a seeding attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Demo data was written.
    Seeded,
    /// The store already holds users; nothing was changed.
    AlreadySeeded,
}

fn demo_user(username: &str, role: Role, organization: &str) -> Result<User, Error> {
    let username = Username::new(username)
        .map_err(|err| Error::internal(format!("invalid seed username: {err}")))?;
    Ok(User::new(username, role, Some(organization.to_owned())))
}

/// Seed demo users and the sample verified plantation.
///
/// # Errors
/// Propagates store and workflow failures; a partially seeded store will be
/// skipped on the next start once the users exist.
pub async fn seed_demo_data(
    store: &Arc<dyn LedgerStore>,
    commands: &dyn MarketplaceCommand,
) -> Result<SeedOutcome, Error> {
    let existing = store
        .count_users()
        .await
        .map_err(|err| Error::internal(format!("seed user count failed: {err}")))?;
    if existing > 0 {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let ngo = demo_user("mangrove_ngo", Role::Ngo, "Mangrove Conservation NGO")?;
    let buyer = demo_user("ecotech_buyer", Role::Buyer, "EcoTech Solutions")?;
    let admin = demo_user("admin", Role::Admin, "EcoLedger Admin")?;
    for user in [&ngo, &buyer, &admin] {
        store
            .create_user(user)
            .await
            .map_err(|err| Error::internal(format!("seed user insert failed: {err}")))?;
    }

    let plantation = commands
        .submit_plantation(SubmitPlantationRequest {
            ngo_id: ngo.id,
            mangrove_count: 500,
            latitude: Decimal::new(13521, 4),
            longitude: Decimal::new(1038198, 4),
            notes: Some("Rhizophora species planted in coastal restoration area".to_owned()),
            image_url: None,
        })
        .await?;
    let minted = commands
        .verify_plantation(VerifyPlantationRequest {
            plantation_id: plantation.id,
            verified_by: admin.id,
        })
        .await?;

    info!(
        ngo = %ngo.username,
        buyer = %buyer.username,
        admin = %admin.username,
        credits = minted.credit.amount,
        "seeded demo data"
    );
    Ok(SeedOutcome::Seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketplaceCommandService;
    use crate::domain::credit::CreditStatus;
    use crate::outbound::persistence::MemoryLedgerStore;

    async fn seeded_store() -> (Arc<dyn LedgerStore>, SeedOutcome) {
        let memory = Arc::new(MemoryLedgerStore::new());
        let commands = MarketplaceCommandService::new(Arc::clone(&memory));
        let store: Arc<dyn LedgerStore> = memory;
        let outcome = seed_demo_data(&store, &commands)
            .await
            .expect("seeding succeeds");
        (store, outcome)
    }

    #[tokio::test]
    async fn seeds_users_and_sample_marketplace_state() {
        let (store, outcome) = seeded_store().await;
        assert_eq!(outcome, SeedOutcome::Seeded);

        assert_eq!(store.count_users().await.expect("count loads"), 3);
        for role in [Role::Ngo, Role::Buyer, Role::Admin] {
            assert!(
                store
                    .find_user_by_role(role)
                    .await
                    .expect("lookup succeeds")
                    .is_some()
            );
        }

        let available = store
            .credits_by_status(CreditStatus::Available)
            .await
            .expect("credits load");
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].amount, 5);

        let entries = store.ledger_entries().await.expect("entries load");
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let (store, _) = seeded_store().await;
        let commands = MarketplaceCommandService::new(Arc::new(MemoryLedgerStore::new()));

        let outcome = seed_demo_data(&store, &commands)
            .await
            .expect("second run succeeds");
        assert_eq!(outcome, SeedOutcome::AlreadySeeded);
        assert_eq!(store.count_users().await.expect("count loads"), 3);
    }
}
