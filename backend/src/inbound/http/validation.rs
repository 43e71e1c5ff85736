//! Shared validation helpers for inbound HTTP adapters.

use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn invalid_value_error(field: FieldName, message: String, code: &str, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code,
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!("{name} must be a valid UUID"),
            "invalid_uuid",
            value,
        )
    })
}

pub(crate) fn parse_decimal(value: &str, field: FieldName) -> Result<Decimal, Error> {
    value.parse::<Decimal>().map_err(|_| {
        let name = field.as_str();
        invalid_value_error(
            field,
            format!("{name} must be a decimal number"),
            "invalid_decimal",
            value,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uuid_accepts_canonical_form() {
        let id = Uuid::new_v4();
        let parsed = parse_uuid(&id.to_string(), FieldName::new("ngoId")).expect("uuid parses");
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_uuid_reports_field_and_value() {
        let err = parse_uuid("not-a-uuid", FieldName::new("ngoId")).expect_err("must fail");
        let details = err.details.expect("details present");
        assert_eq!(details["field"], "ngoId");
        assert_eq!(details["value"], "not-a-uuid");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[test]
    fn parse_decimal_accepts_fractional_strings() {
        let value = parse_decimal("1.3521", FieldName::new("latitude")).expect("decimal parses");
        assert_eq!(value.to_string(), "1.3521");
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        let err = parse_decimal("north", FieldName::new("latitude")).expect_err("must fail");
        let details = err.details.expect("details present");
        assert_eq!(details["code"], "invalid_decimal");
    }
}
