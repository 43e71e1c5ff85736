//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain; they exist to satisfy Diesel's type
//! requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{credits, ledger_entries, plantations, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub organization_name: Option<String>,
    #[expect(dead_code, reason = "schema field read for completeness; not surfaced")]
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub role: &'a str,
    pub organization_name: Option<&'a str>,
}

/// Row struct for reading from the plantations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plantations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlantationRow {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub mangrove_count: i32,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub credits_earned: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
}

/// Insertable struct for creating plantation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plantations)]
pub(crate) struct NewPlantationRow<'a> {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub mangrove_count: i32,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub notes: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub credits_earned: i32,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset applying the verification stamp.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plantations)]
pub(crate) struct PlantationVerifyChanges<'a> {
    pub status: &'a str,
    pub verified_at: DateTime<Utc>,
    pub verified_by: Uuid,
}

/// Row struct for reading from the credits table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = credits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CreditRow {
    pub id: Uuid,
    pub plantation_id: Uuid,
    pub ngo_id: Uuid,
    pub current_owner_id: Uuid,
    pub amount: i32,
    pub price_per_credit: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating credit records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = credits)]
pub(crate) struct NewCreditRow<'a> {
    pub id: Uuid,
    pub plantation_id: Uuid,
    pub ngo_id: Uuid,
    pub current_owner_id: Uuid,
    pub amount: i32,
    pub price_per_credit: Decimal,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Changeset applying the ownership flip on purchase.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = credits)]
pub(crate) struct CreditTransferChanges<'a> {
    pub current_owner_id: Uuid,
    pub status: &'a str,
}

/// Row struct for reading from the ledger_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub transaction_hash: String,
    pub kind: String,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Uuid,
    pub credit_id: Option<Uuid>,
    pub amount: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub transaction_hash: &'a str,
    pub kind: &'a str,
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Uuid,
    pub credit_id: Option<Uuid>,
    pub amount: i32,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
}
