//! Plantation claims and the credit accrual rule.
//!
//! A plantation is an NGO's claim of mangroves planted at a coordinate. The
//! credit amount is derived once at submission via [`credits_for`] and never
//! recomputed; verification and rejection are terminal transitions applied
//! by the ledger store under a status precondition.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Mangroves required to earn a single carbon credit.
pub const MANGROVES_PER_CREDIT: i32 = 100;

/// Credits earned for a mangrove count: floor division by
/// [`MANGROVES_PER_CREDIT`]. Counts below one hundred earn zero credits;
/// such submissions stay valid, they simply mint nothing when verified.
pub const fn credits_for(mangrove_count: i32) -> i32 {
    mangrove_count / MANGROVES_PER_CREDIT
}

/// Validation errors for plantation value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantationValidationError {
    MangroveCountOutOfRange { min: i32, max: i32 },
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

impl fmt::Display for PlantationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MangroveCountOutOfRange { min, max } => {
                write!(f, "mangrove count must be between {min} and {max}")
            }
            Self::LatitudeOutOfRange => write!(f, "latitude must be between -90 and 90"),
            Self::LongitudeOutOfRange => write!(f, "longitude must be between -180 and 180"),
        }
    }
}

impl std::error::Error for PlantationValidationError {}

/// Smallest accepted mangrove count for a submission.
pub const MANGROVE_COUNT_MIN: i32 = 1;
/// Largest accepted mangrove count for a submission.
pub const MANGROVE_COUNT_MAX: i32 = 10_000;

/// Number of mangroves claimed by a submission.
///
/// ## Invariants
/// - within [`MANGROVE_COUNT_MIN`]..=[`MANGROVE_COUNT_MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MangroveCount(i32);

impl MangroveCount {
    /// Validate and construct a [`MangroveCount`].
    pub fn new(count: i32) -> Result<Self, PlantationValidationError> {
        if !(MANGROVE_COUNT_MIN..=MANGROVE_COUNT_MAX).contains(&count) {
            return Err(PlantationValidationError::MangroveCountOutOfRange {
                min: MANGROVE_COUNT_MIN,
                max: MANGROVE_COUNT_MAX,
            });
        }
        Ok(Self(count))
    }

    /// The raw count.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<MangroveCount> for i32 {
    fn from(value: MangroveCount) -> Self {
        value.0
    }
}

impl TryFrom<i32> for MangroveCount {
    type Error = PlantationValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Geocoordinate of a planting site, held as exact decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    /// Degrees north, -90..=90.
    #[schema(value_type = String, example = "1.3521")]
    pub latitude: Decimal,
    /// Degrees east, -180..=180.
    #[schema(value_type = String, example = "103.8198")]
    pub longitude: Decimal,
}

impl GeoPoint {
    /// Validate and construct a [`GeoPoint`].
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self, PlantationValidationError> {
        let lat_bound = Decimal::from(90);
        let lon_bound = Decimal::from(180);
        if latitude < -lat_bound || latitude > lat_bound {
            return Err(PlantationValidationError::LatitudeOutOfRange);
        }
        if longitude < -lon_bound || longitude > lon_bound {
            return Err(PlantationValidationError::LongitudeOutOfRange);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Lifecycle state of a plantation claim.
///
/// `pending --verify--> verified` and `pending --reject--> rejected`; both
/// outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlantationStatus {
    Pending,
    Verified,
    Rejected,
}

impl PlantationStatus {
    /// Stable lowercase identifier as stored and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PlantationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown plantation status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plantation status: {0}")]
pub struct PlantationStatusParseError(pub String);

impl std::str::FromStr for PlantationStatus {
    type Err = PlantationStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(PlantationStatusParseError(other.to_owned())),
        }
    }
}

/// Validated inputs for a new plantation submission.
#[derive(Debug, Clone)]
pub struct PlantationDraft {
    pub ngo_id: Uuid,
    pub mangrove_count: MangroveCount,
    pub location: GeoPoint,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// A claimed planting event awaiting or having received verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plantation {
    /// Stable identifier.
    pub id: Uuid,
    /// Owning NGO.
    pub ngo_id: Uuid,
    /// Claimed number of mangroves planted.
    #[schema(value_type = i32, example = 500)]
    pub mangrove_count: MangroveCount,
    /// Planting site.
    #[serde(flatten)]
    pub location: GeoPoint,
    /// Free-form evidence notes.
    pub notes: Option<String>,
    /// Optional reference to uploaded evidence imagery.
    pub image_url: Option<String>,
    /// Credits accrued at submission time; never recomputed.
    pub credits_earned: i32,
    /// Lifecycle state.
    pub status: PlantationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Set when the claim is verified.
    pub verified_at: Option<DateTime<Utc>>,
    /// Admin that verified the claim.
    pub verified_by: Option<Uuid>,
}

impl Plantation {
    /// Create a pending plantation from a validated draft.
    ///
    /// Computes `credits_earned` once via [`credits_for`]; no credit or
    /// ledger entry exists until the claim is verified.
    pub fn submit(draft: PlantationDraft) -> Self {
        let PlantationDraft {
            ngo_id,
            mangrove_count,
            location,
            notes,
            image_url,
        } = draft;
        Self {
            id: Uuid::new_v4(),
            ngo_id,
            mangrove_count,
            location,
            notes,
            image_url,
            credits_earned: credits_for(mangrove_count.get()),
            status: PlantationStatus::Pending,
            created_at: Utc::now(),
            verified_at: None,
            verified_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::Decimal;

    use super::*;

    fn coordinates() -> GeoPoint {
        GeoPoint::new(Decimal::new(13521, 4), Decimal::new(1038198, 4)).expect("valid coordinates")
    }

    #[rstest]
    #[case(0, 0)]
    #[case(99, 0)]
    #[case(100, 1)]
    #[case(250, 2)]
    #[case(500, 5)]
    #[case(10_000, 100)]
    fn credits_follow_floor_division(#[case] count: i32, #[case] expected: i32) {
        assert_eq!(credits_for(count), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    #[case(10_001)]
    fn mangrove_count_rejects_out_of_range(#[case] raw: i32) {
        assert!(MangroveCount::new(raw).is_err());
    }

    #[test]
    fn geo_point_rejects_out_of_range_latitude() {
        let err = GeoPoint::new(Decimal::from(91), Decimal::from(0)).expect_err("must fail");
        assert_eq!(err, PlantationValidationError::LatitudeOutOfRange);
    }

    #[test]
    fn geo_point_rejects_out_of_range_longitude() {
        let err = GeoPoint::new(Decimal::from(0), Decimal::from(-181)).expect_err("must fail");
        assert_eq!(err, PlantationValidationError::LongitudeOutOfRange);
    }

    #[test]
    fn submit_creates_pending_claim_with_derived_credits() {
        let ngo_id = Uuid::new_v4();
        let plantation = Plantation::submit(PlantationDraft {
            ngo_id,
            mangrove_count: MangroveCount::new(250).expect("valid count"),
            location: coordinates(),
            notes: Some("tidal flat replanting".to_owned()),
            image_url: None,
        });

        assert_eq!(plantation.ngo_id, ngo_id);
        assert_eq!(plantation.credits_earned, 2);
        assert_eq!(plantation.status, PlantationStatus::Pending);
        assert!(plantation.verified_at.is_none());
        assert!(plantation.verified_by.is_none());
    }

    #[test]
    fn sub_hundred_submissions_accrue_zero_credits() {
        let plantation = Plantation::submit(PlantationDraft {
            ngo_id: Uuid::new_v4(),
            mangrove_count: MangroveCount::new(99).expect("valid count"),
            location: coordinates(),
            notes: None,
            image_url: None,
        });
        assert_eq!(plantation.credits_earned, 0);
    }

    #[test]
    fn plantation_serialises_flattened_coordinates() {
        let plantation = Plantation::submit(PlantationDraft {
            ngo_id: Uuid::new_v4(),
            mangrove_count: MangroveCount::new(500).expect("valid count"),
            location: coordinates(),
            notes: None,
            image_url: None,
        });
        let value = serde_json::to_value(&plantation).expect("plantation serialises");
        assert_eq!(value["mangroveCount"], 500);
        assert_eq!(value["latitude"], "1.3521");
        assert_eq!(value["longitude"], "103.8198");
        assert_eq!(value["status"], "pending");
        assert_eq!(value["creditsEarned"], 5);
    }
}
