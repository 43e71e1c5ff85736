//! Append-only ledger of mint and transfer events.
//!
//! Every credit movement is recorded as an immutable entry: minting on
//! verification (no source user) and transfer on purchase. Entries are never
//! mutated or deleted. The wire contract keeps the public API's established
//! field names (`transactionHash`, `type`, `fromUserId`, ...).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::credit::Credit;

/// Kind of ledger event, serialised as `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryKind {
    /// Creation of new credits as a side effect of verification.
    Mint,
    /// Change of credit ownership via purchase.
    Transfer,
}

impl LedgerEntryKind {
    /// Stable lowercase identifier as stored and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown ledger entry kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ledger entry kind: {0}")]
pub struct LedgerEntryKindParseError(pub String);

impl std::str::FromStr for LedgerEntryKind {
    type Err = LedgerEntryKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mint" => Ok(Self::Mint),
            "transfer" => Ok(Self::Transfer),
            other => Err(LedgerEntryKindParseError(other.to_owned())),
        }
    }
}

/// Settlement state of a ledger entry. Entries are written `confirmed`; the
/// pending state exists in the contract but is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryStatus {
    Pending,
    Confirmed,
}

impl LedgerEntryStatus {
    /// Stable lowercase identifier as stored and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for LedgerEntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown ledger entry status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ledger entry status: {0}")]
pub struct LedgerEntryStatusParseError(pub String);

impl std::str::FromStr for LedgerEntryStatus {
    type Err = LedgerEntryStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(LedgerEntryStatusParseError(other.to_owned())),
        }
    }
}

/// Display-only transaction hash shown on the public ledger.
///
/// Derived from six random bytes and formatted for display
/// (`0xA4F2E9...B8C3D1`); carries no cryptographic meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(String);

impl TransactionHash {
    /// Generate a fresh display hash.
    pub fn generate() -> Self {
        let bytes: [u8; 6] = rand::random();
        let digits = hex::encode_upper(bytes);
        let (head, tail) = digits.split_at(6);
        Self(format!("0x{head}...{tail}"))
    }

    /// Wrap a stored hash without re-deriving it.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for TransactionHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Immutable audit record of a mint or transfer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Stable identifier.
    pub id: Uuid,
    /// Display hash shown on the ledger page.
    #[schema(value_type = String, example = "0xA4F2E9...B8C3D1")]
    pub transaction_hash: TransactionHash,
    /// Mint or transfer.
    #[serde(rename = "type")]
    pub kind: LedgerEntryKind,
    /// Source of the credits; absent for mint events.
    pub from_user_id: Option<Uuid>,
    /// Recipient of the credits.
    pub to_user_id: Uuid,
    /// Credit block the event concerns.
    pub credit_id: Option<Uuid>,
    /// Credits moved.
    pub amount: i32,
    /// Settlement state; always `confirmed` in practice.
    pub status: LedgerEntryStatus,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record the minting of a freshly created credit block to its NGO.
    pub fn mint(credit: &Credit) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_hash: TransactionHash::generate(),
            kind: LedgerEntryKind::Mint,
            from_user_id: None,
            to_user_id: credit.ngo_id,
            credit_id: Some(credit.id),
            amount: credit.amount,
            status: LedgerEntryStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    /// Record the transfer of a credit block to its new owner.
    ///
    /// Call with the credit *after* the ownership flip; `from_user_id` names
    /// the previous owner.
    pub fn transfer(credit: &Credit, previous_owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_hash: TransactionHash::generate(),
            kind: LedgerEntryKind::Transfer,
            from_user_id: Some(previous_owner_id),
            to_user_id: credit.current_owner_id,
            credit_id: Some(credit.id),
            amount: credit.amount,
            status: LedgerEntryStatus::Confirmed,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::credit::{Credit, CreditStatus, default_price_per_credit};
    use crate::domain::plantation::{GeoPoint, MangroveCount, Plantation, PlantationDraft};

    fn minted_credit() -> Credit {
        let plantation = Plantation::submit(PlantationDraft {
            ngo_id: Uuid::new_v4(),
            mangrove_count: MangroveCount::new(500).expect("valid count"),
            location: GeoPoint::new(Decimal::new(13521, 4), Decimal::new(1038198, 4))
                .expect("valid coordinates"),
            notes: None,
            image_url: None,
        });
        Credit::mint(&plantation, default_price_per_credit())
    }

    #[test]
    fn generated_hash_matches_display_format() {
        let hash = TransactionHash::generate();
        let raw = hash.as_ref();
        assert!(raw.starts_with("0x"));
        assert_eq!(raw.len(), 17);
        assert_eq!(&raw[8..11], "...");
        assert!(
            raw[2..8]
                .chars()
                .chain(raw[11..].chars())
                .all(|c| c.is_ascii_hexdigit())
        );
    }

    #[test]
    fn mint_entry_has_no_source_user() {
        let credit = minted_credit();
        let entry = LedgerEntry::mint(&credit);

        assert_eq!(entry.kind, LedgerEntryKind::Mint);
        assert!(entry.from_user_id.is_none());
        assert_eq!(entry.to_user_id, credit.ngo_id);
        assert_eq!(entry.credit_id, Some(credit.id));
        assert_eq!(entry.amount, credit.amount);
        assert_eq!(entry.status, LedgerEntryStatus::Confirmed);
    }

    #[test]
    fn transfer_entry_links_previous_and_new_owner() {
        let mut credit = minted_credit();
        let seller = credit.current_owner_id;
        let buyer = Uuid::new_v4();
        credit.current_owner_id = buyer;
        credit.status = CreditStatus::Sold;

        let entry = LedgerEntry::transfer(&credit, seller);
        assert_eq!(entry.kind, LedgerEntryKind::Transfer);
        assert_eq!(entry.from_user_id, Some(seller));
        assert_eq!(entry.to_user_id, buyer);
        assert_eq!(entry.amount, credit.amount);
    }

    #[test]
    fn entry_serialises_kind_as_type() {
        let credit = minted_credit();
        let value = serde_json::to_value(LedgerEntry::mint(&credit)).expect("entry serialises");
        assert_eq!(value["type"], "mint");
        assert!(value["fromUserId"].is_null());
        assert!(value["transactionHash"].as_str().is_some());
    }
}
