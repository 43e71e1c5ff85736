//! Tradeable carbon credit blocks.
//!
//! A credit block is minted only as a side effect of verifying a plantation
//! and always carries that plantation's full accrued amount. Blocks are
//! never split: a purchase transfers the whole block and retires it from the
//! marketplace (`available --purchase--> sold`, terminal).

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::plantation::Plantation;

/// Marketplace state of a credit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    Available,
    Sold,
}

impl CreditStatus {
    /// Stable lowercase identifier as stored and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown credit status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown credit status: {0}")]
pub struct CreditStatusParseError(pub String);

impl std::str::FromStr for CreditStatus {
    type Err = CreditStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "sold" => Ok(Self::Sold),
            other => Err(CreditStatusParseError(other.to_owned())),
        }
    }
}

/// Asking price applied to newly minted credits.
pub fn default_price_per_credit() -> Decimal {
    Decimal::new(2500, 2)
}

/// A block of verified carbon credits traced to one plantation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    /// Stable identifier.
    pub id: Uuid,
    /// Plantation whose verification minted this block.
    pub plantation_id: Uuid,
    /// NGO that originated the block.
    pub ngo_id: Uuid,
    /// Current owner; the NGO until the block is sold.
    pub current_owner_id: Uuid,
    /// Credits in the block; equals the plantation's accrued amount.
    pub amount: i32,
    /// Asking price per credit.
    #[schema(value_type = String, example = "25.00")]
    pub price_per_credit: Decimal,
    /// Marketplace state.
    pub status: CreditStatus,
    /// Minting timestamp.
    pub created_at: DateTime<Utc>,
}

impl Credit {
    /// Mint a credit block for a verified plantation.
    ///
    /// The amount is taken from the plantation's accrued credits and the NGO
    /// starts as owner.
    pub fn mint(plantation: &Plantation, price_per_credit: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            plantation_id: plantation.id,
            ngo_id: plantation.ngo_id,
            current_owner_id: plantation.ngo_id,
            amount: plantation.credits_earned,
            price_per_credit,
            status: CreditStatus::Available,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::plantation::{GeoPoint, MangroveCount, Plantation, PlantationDraft};

    fn verified_plantation() -> Plantation {
        Plantation::submit(PlantationDraft {
            ngo_id: Uuid::new_v4(),
            mangrove_count: MangroveCount::new(500).expect("valid count"),
            location: GeoPoint::new(Decimal::new(13521, 4), Decimal::new(1038198, 4))
                .expect("valid coordinates"),
            notes: None,
            image_url: None,
        })
    }

    #[test]
    fn mint_copies_amount_and_assigns_ngo_ownership() {
        let plantation = verified_plantation();
        let credit = Credit::mint(&plantation, default_price_per_credit());

        assert_eq!(credit.plantation_id, plantation.id);
        assert_eq!(credit.ngo_id, plantation.ngo_id);
        assert_eq!(credit.current_owner_id, plantation.ngo_id);
        assert_eq!(credit.amount, 5);
        assert_eq!(credit.status, CreditStatus::Available);
    }

    #[test]
    fn default_price_serialises_with_two_decimal_places() {
        let credit = Credit::mint(&verified_plantation(), default_price_per_credit());
        let value = serde_json::to_value(&credit).expect("credit serialises");
        assert_eq!(value["pricePerCredit"], "25.00");
        assert_eq!(value["status"], "available");
    }
}
