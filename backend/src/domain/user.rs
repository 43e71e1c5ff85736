//! User identity and role model.
//!
//! Users exist only through the seed bootstrap; there is no registration
//! flow. The role determines which marketplace operations a session may
//! perform.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Marketplace role attached to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Organisation submitting plantation claims.
    Ngo,
    /// Purchaser of verified carbon credits.
    Buyer,
    /// Verifier of plantation submissions.
    Admin,
}

impl Role {
    /// Stable lowercase identifier as stored and serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ngo => "ngo",
            Self::Buyer => "buyer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown role identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ngo" => Ok(Self::Ngo),
            "buyer" => Ok(Self::Buyer),
            "admin" => Ok(Self::Admin),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, or underscores",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;

/// Login name for a user.
///
/// ## Invariants
/// - non-empty once trimmed of whitespace
/// - at most [`USERNAME_MAX`] characters of `[A-Za-z0-9_]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Marketplace participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: Uuid,
    /// Login name, unique across users.
    #[schema(value_type = String, example = "mangrove_ngo")]
    pub username: Username,
    /// Marketplace role.
    pub role: Role,
    /// Display name of the organisation behind the account.
    pub organization_name: Option<String>,
}

impl User {
    /// Build a new user with a fresh identifier.
    pub fn new(username: Username, role: Role, organization_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            role,
            organization_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("   ", UserValidationError::EmptyUsername)]
    #[case("has spaces", UserValidationError::UsernameInvalidCharacters)]
    #[case("hyphen-ated", UserValidationError::UsernameInvalidCharacters)]
    fn username_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(Username::new(raw).expect_err("must fail"), expected);
    }

    #[test]
    fn username_rejects_overlong_input() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        assert_eq!(
            Username::new(raw).expect_err("must fail"),
            UserValidationError::UsernameTooLong { max: USERNAME_MAX },
        );
    }

    #[test]
    fn username_accepts_alphanumerics_and_underscores() {
        let name = Username::new("eco_buyer_01").expect("valid username");
        assert_eq!(name.as_ref(), "eco_buyer_01");
    }

    #[rstest]
    #[case(Role::Ngo, "ngo")]
    #[case(Role::Buyer, "buyer")]
    #[case(Role::Admin, "admin")]
    fn role_round_trips_through_str(#[case] role: Role, #[case] raw: &str) {
        assert_eq!(role.as_str(), raw);
        assert_eq!(raw.parse::<Role>().expect("role parses"), role);
    }

    #[test]
    fn role_rejects_unknown_identifier() {
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn user_serialises_camel_case() {
        let user = User::new(
            Username::new("mangrove_ngo").expect("valid username"),
            Role::Ngo,
            Some("Mangrove Conservation NGO".to_owned()),
        );
        let value = serde_json::to_value(&user).expect("user serialises");
        assert_eq!(value["username"], "mangrove_ngo");
        assert_eq!(value["role"], "ngo");
        assert_eq!(value["organizationName"], "Mangrove Conservation NGO");
    }
}
