//! PostgreSQL-backed [`LedgerStore`] implementation using Diesel ORM.
//!
//! Rows rehydrate through the validated domain constructors. The compound
//! transitions run inside a single database transaction and guard the
//! status flip with a conditional update (`... WHERE status = <expected>`),
//! so racing calls cannot double-mint or double-sell: the loser's update
//! matches zero rows and the whole transaction rolls back.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::credit::{Credit, CreditStatus};
use crate::domain::ledger_entry::{
    LedgerEntry, LedgerEntryKind, LedgerEntryStatus, TransactionHash,
};
use crate::domain::plantation::{GeoPoint, MangroveCount, Plantation, PlantationStatus};
use crate::domain::ports::{
    LedgerStore, LedgerStoreError, TransferCredit, TransferredCredit, VerifiedMint, VerifyAndMint,
};
use crate::domain::user::{Role, User, Username};

use super::models::{
    CreditRow, CreditTransferChanges, LedgerEntryRow, NewCreditRow, NewLedgerEntryRow,
    NewPlantationRow, NewUserRow, PlantationRow, PlantationVerifyChanges, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{credits, ledger_entries, plantations, users};

/// Diesel-backed implementation of the ledger store port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LedgerStoreError {
    let (PoolError::Checkout { message } | PoolError::Build { message }) = error;
    LedgerStoreError::connection(message)
}

impl From<diesel::result::Error> for LedgerStoreError {
    fn from(error: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match &error {
            DieselError::DatabaseError(kind, info) => {
                tracing::debug!(?kind, message = info.message(), "diesel operation failed");
            }
            other => {
                tracing::debug!(error = %other, "diesel operation failed");
            }
        }

        match error {
            DieselError::NotFound => Self::query("record not found"),
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::connection("database connection error")
            }
            _ => Self::query("database error"),
        }
    }
}

fn row_to_user(row: UserRow) -> Result<User, LedgerStoreError> {
    let username =
        Username::new(row.username).map_err(|err| LedgerStoreError::query(err.to_string()))?;
    let role =
        Role::from_str(&row.role).map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(User {
        id: row.id,
        username,
        role,
        organization_name: row.organization_name,
    })
}

fn row_to_plantation(row: PlantationRow) -> Result<Plantation, LedgerStoreError> {
    let mangrove_count = MangroveCount::new(row.mangrove_count)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    let location = GeoPoint::new(row.latitude, row.longitude)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    let status = PlantationStatus::from_str(&row.status)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(Plantation {
        id: row.id,
        ngo_id: row.ngo_id,
        mangrove_count,
        location,
        notes: row.notes,
        image_url: row.image_url,
        credits_earned: row.credits_earned,
        status,
        created_at: row.created_at,
        verified_at: row.verified_at,
        verified_by: row.verified_by,
    })
}

fn row_to_credit(row: CreditRow) -> Result<Credit, LedgerStoreError> {
    let status = CreditStatus::from_str(&row.status)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(Credit {
        id: row.id,
        plantation_id: row.plantation_id,
        ngo_id: row.ngo_id,
        current_owner_id: row.current_owner_id,
        amount: row.amount,
        price_per_credit: row.price_per_credit,
        status,
        created_at: row.created_at,
    })
}

fn row_to_entry(row: LedgerEntryRow) -> Result<LedgerEntry, LedgerStoreError> {
    let kind = LedgerEntryKind::from_str(&row.kind)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    let status = LedgerEntryStatus::from_str(&row.status)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(LedgerEntry {
        id: row.id,
        transaction_hash: TransactionHash::from_stored(row.transaction_hash),
        kind,
        from_user_id: row.from_user_id,
        to_user_id: row.to_user_id,
        credit_id: row.credit_id,
        amount: row.amount,
        status,
        created_at: row.created_at,
    })
}

fn new_credit_row(credit: &Credit) -> NewCreditRow<'_> {
    NewCreditRow {
        id: credit.id,
        plantation_id: credit.plantation_id,
        ngo_id: credit.ngo_id,
        current_owner_id: credit.current_owner_id,
        amount: credit.amount,
        price_per_credit: credit.price_per_credit,
        status: credit.status.as_str(),
        created_at: credit.created_at,
    }
}

fn new_entry_row(entry: &LedgerEntry) -> NewLedgerEntryRow<'_> {
    NewLedgerEntryRow {
        id: entry.id,
        transaction_hash: entry.transaction_hash.as_ref(),
        kind: entry.kind.as_str(),
        from_user_id: entry.from_user_id,
        to_user_id: entry.to_user_id,
        credit_id: entry.credit_id,
        amount: entry.amount,
        status: entry.status.as_str(),
        created_at: entry.created_at,
    }
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn create_user(&self, user: &User) -> Result<(), LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: user.id,
            username: user.username.as_ref(),
            role: user.role.as_str(),
            organization_name: user.organization_name.as_deref(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = users::table.count().get_result(&mut conn).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()?;
        row.map(row_to_user).transpose()
    }

    async fn find_user_by_role(&self, role: Role) -> Result<Option<User>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::role.eq(role.as_str()))
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()?;
        row.map(row_to_user).transpose()
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn create_plantation(&self, plantation: &Plantation) -> Result<(), LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPlantationRow {
            id: plantation.id,
            ngo_id: plantation.ngo_id,
            mangrove_count: plantation.mangrove_count.get(),
            latitude: plantation.location.latitude,
            longitude: plantation.location.longitude,
            notes: plantation.notes.as_deref(),
            image_url: plantation.image_url.as_deref(),
            credits_earned: plantation.credits_earned,
            status: plantation.status.as_str(),
            created_at: plantation.created_at,
        };
        diesel::insert_into(plantations::table)
            .values(&row)
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn find_plantation(&self, id: Uuid) -> Result<Option<Plantation>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = plantations::table
            .find(id)
            .select(PlantationRow::as_select())
            .first::<PlantationRow>(&mut conn)
            .await
            .optional()?;
        row.map(row_to_plantation).transpose()
    }

    async fn find_plantations(&self, ids: &[Uuid]) -> Result<Vec<Plantation>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlantationRow> = plantations::table
            .filter(plantations::id.eq_any(ids))
            .select(PlantationRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_plantation).collect()
    }

    async fn plantations_by_ngo(&self, ngo_id: Uuid) -> Result<Vec<Plantation>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlantationRow> = plantations::table
            .filter(plantations::ngo_id.eq(ngo_id))
            .order(plantations::created_at.desc())
            .select(PlantationRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_plantation).collect()
    }

    async fn plantations_by_status(
        &self,
        status: PlantationStatus,
    ) -> Result<Vec<Plantation>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlantationRow> = plantations::table
            .filter(plantations::status.eq(status.as_str()))
            .order(plantations::created_at.desc())
            .select(PlantationRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_plantation).collect()
    }

    async fn find_credit(&self, id: Uuid) -> Result<Option<Credit>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = credits::table
            .find(id)
            .select(CreditRow::as_select())
            .first::<CreditRow>(&mut conn)
            .await
            .optional()?;
        row.map(row_to_credit).transpose()
    }

    async fn credits_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credit>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CreditRow> = credits::table
            .filter(credits::current_owner_id.eq(owner_id))
            .order(credits::created_at.desc())
            .select(CreditRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_credit).collect()
    }

    async fn credits_by_status(
        &self,
        status: CreditStatus,
    ) -> Result<Vec<Credit>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CreditRow> = credits::table
            .filter(credits::status.eq(status.as_str()))
            .order(credits::created_at.desc())
            .select(CreditRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_credit).collect()
    }

    async fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .order(ledger_entries::created_at.desc())
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn ledger_entries_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LedgerEntryRow> = ledger_entries::table
            .filter(
                ledger_entries::from_user_id
                    .eq(user_id)
                    .or(ledger_entries::to_user_id.eq(user_id)),
            )
            .order(ledger_entries::created_at.desc())
            .select(LedgerEntryRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn verify_and_mint(
        &self,
        command: VerifyAndMint,
    ) -> Result<VerifiedMint, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let VerifyAndMint {
            plantation_id,
            verified_by,
            price_per_credit,
        } = command;

        conn.transaction::<VerifiedMint, LedgerStoreError, _>(|conn| {
            async move {
                let updated: Option<PlantationRow> = diesel::update(
                    plantations::table.filter(
                        plantations::id
                            .eq(plantation_id)
                            .and(plantations::status.eq(PlantationStatus::Pending.as_str())),
                    ),
                )
                .set(&PlantationVerifyChanges {
                    status: PlantationStatus::Verified.as_str(),
                    verified_at: Utc::now(),
                    verified_by,
                })
                .returning(PlantationRow::as_returning())
                .get_result::<PlantationRow>(conn)
                .await
                .optional()?;

                let Some(row) = updated else {
                    let exists: i64 = plantations::table
                        .filter(plantations::id.eq(plantation_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    return Err(if exists == 0 {
                        LedgerStoreError::not_found("plantation", plantation_id)
                    } else {
                        LedgerStoreError::invalid_transition(
                            "plantation has already been decided",
                        )
                    });
                };

                let plantation = row_to_plantation(row)?;
                let credit = Credit::mint(&plantation, price_per_credit);
                diesel::insert_into(credits::table)
                    .values(&new_credit_row(&credit))
                    .execute(conn)
                    .await?;

                let entry = LedgerEntry::mint(&credit);
                diesel::insert_into(ledger_entries::table)
                    .values(&new_entry_row(&entry))
                    .execute(conn)
                    .await?;

                Ok(VerifiedMint {
                    plantation,
                    credit,
                    entry,
                })
            }
            .scope_boxed()
        })
        .await
    }

    async fn reject_plantation(
        &self,
        plantation_id: Uuid,
    ) -> Result<Plantation, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated: Option<PlantationRow> = diesel::update(
            plantations::table.filter(
                plantations::id
                    .eq(plantation_id)
                    .and(plantations::status.eq(PlantationStatus::Pending.as_str())),
            ),
        )
        .set(plantations::status.eq(PlantationStatus::Rejected.as_str()))
        .returning(PlantationRow::as_returning())
        .get_result::<PlantationRow>(&mut conn)
        .await
        .optional()?;

        match updated {
            Some(row) => row_to_plantation(row),
            None => {
                let exists: i64 = plantations::table
                    .filter(plantations::id.eq(plantation_id))
                    .count()
                    .get_result(&mut conn)
                    .await?;
                Err(if exists == 0 {
                    LedgerStoreError::not_found("plantation", plantation_id)
                } else {
                    LedgerStoreError::invalid_transition("plantation has already been decided")
                })
            }
        }
    }

    async fn transfer_credit(
        &self,
        command: TransferCredit,
    ) -> Result<TransferredCredit, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let TransferCredit {
            credit_id,
            buyer_id,
        } = command;

        conn.transaction::<TransferredCredit, LedgerStoreError, _>(|conn| {
            async move {
                let existing: Option<CreditRow> = credits::table
                    .find(credit_id)
                    .select(CreditRow::as_select())
                    .first::<CreditRow>(conn)
                    .await
                    .optional()?;
                let Some(existing) = existing else {
                    return Err(LedgerStoreError::not_found("credit", credit_id));
                };
                let previous_owner_id = existing.current_owner_id;

                // The conditional update is the authoritative guard; of two
                // racing purchases the loser matches zero rows here.
                let updated: Option<CreditRow> = diesel::update(
                    credits::table.filter(
                        credits::id
                            .eq(credit_id)
                            .and(credits::status.eq(CreditStatus::Available.as_str())),
                    ),
                )
                .set(&CreditTransferChanges {
                    current_owner_id: buyer_id,
                    status: CreditStatus::Sold.as_str(),
                })
                .returning(CreditRow::as_returning())
                .get_result::<CreditRow>(conn)
                .await
                .optional()?;

                let Some(row) = updated else {
                    return Err(LedgerStoreError::invalid_transition(
                        "credit is not available for purchase",
                    ));
                };

                let credit = row_to_credit(row)?;
                let entry = LedgerEntry::transfer(&credit, previous_owner_id);
                diesel::insert_into(ledger_entries::table)
                    .values(&new_entry_row(&entry))
                    .execute(conn)
                    .await?;

                Ok(TransferredCredit { credit, entry })
            }
            .scope_boxed()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};
    use rust_decimal::Decimal;

    use super::*;

    #[fixture]
    fn plantation_row() -> PlantationRow {
        PlantationRow {
            id: Uuid::new_v4(),
            ngo_id: Uuid::new_v4(),
            mangrove_count: 500,
            latitude: Decimal::new(13521, 4),
            longitude: Decimal::new(1038198, 4),
            notes: None,
            image_url: None,
            credits_earned: 5,
            status: "pending".to_owned(),
            created_at: Utc::now(),
            verified_at: None,
            verified_by: None,
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, LedgerStoreError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = LedgerStoreError::from(diesel::result::Error::NotFound);
        assert!(matches!(err, LedgerStoreError::Query { .. }));
        assert!(err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status(mut plantation_row: PlantationRow) {
        plantation_row.status = "approved".to_owned();
        let err = row_to_plantation(plantation_row).expect_err("unknown status must fail");
        assert!(matches!(err, LedgerStoreError::Query { .. }));
        assert!(err.to_string().contains("approved"));
    }

    #[rstest]
    fn row_conversion_rejects_out_of_range_count(mut plantation_row: PlantationRow) {
        plantation_row.mangrove_count = 0;
        let err = row_to_plantation(plantation_row).expect_err("invalid count must fail");
        assert!(matches!(err, LedgerStoreError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_preserves_fields(plantation_row: PlantationRow) {
        let id = plantation_row.id;
        let plantation = row_to_plantation(plantation_row).expect("valid row converts");
        assert_eq!(plantation.id, id);
        assert_eq!(plantation.mangrove_count.get(), 500);
        assert_eq!(plantation.status, PlantationStatus::Pending);
    }

    #[rstest]
    fn user_row_rejects_unknown_role() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "mangrove_ngo".to_owned(),
            role: "superuser".to_owned(),
            organization_name: None,
            created_at: Utc::now(),
        };
        let err = row_to_user(row).expect_err("unknown role must fail");
        assert!(err.to_string().contains("superuser"));
    }
}
