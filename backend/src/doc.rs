//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every REST endpoint and schema for Swagger UI
//! (served at `/docs` in debug builds) and external tooling. The session
//! cookie issued by `POST /api/login` is registered as the security scheme.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::credit::{Credit, CreditStatus};
use crate::domain::ledger_entry::{LedgerEntry, LedgerEntryKind, LedgerEntryStatus};
use crate::domain::plantation::{GeoPoint, Plantation, PlantationStatus};
use crate::domain::ports::{
    CreditListing, LedgerEntryView, MarketplaceStats, NgoSummary, PlantationSummary,
    PurchaseCreditOutcome, UserSummary, VerifyPlantationOutcome,
};
use crate::domain::user::{Role, User};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::credits::PurchaseCreditBody;
use crate::inbound::http::plantations::{SubmitPlantationBody, VerifyPlantationBody};
use crate::inbound::http::users::{LoginRequestBody, LoginResponseBody};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "EcoLedger backend API",
        description = "Mangrove carbon credit marketplace: plantation submission and \
            verification, credit purchase, and the public ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::get_user,
        crate::inbound::http::plantations::submit_plantation,
        crate::inbound::http::plantations::list_plantations_for_ngo,
        crate::inbound::http::plantations::pending_plantations,
        crate::inbound::http::plantations::verify_plantation,
        crate::inbound::http::plantations::reject_plantation,
        crate::inbound::http::credits::available_credits,
        crate::inbound::http::credits::credits_for_owner,
        crate::inbound::http::credits::purchase_credit,
        crate::inbound::http::transactions::list_transactions,
        crate::inbound::http::transactions::transactions_for_user,
        crate::inbound::http::transactions::stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Role,
        Plantation,
        PlantationStatus,
        GeoPoint,
        Credit,
        CreditStatus,
        LedgerEntry,
        LedgerEntryKind,
        LedgerEntryStatus,
        CreditListing,
        NgoSummary,
        PlantationSummary,
        UserSummary,
        LedgerEntryView,
        MarketplaceStats,
        VerifyPlantationOutcome,
        PurchaseCreditOutcome,
        LoginRequestBody,
        LoginResponseBody,
        SubmitPlantationBody,
        VerifyPlantationBody,
        PurchaseCreditBody,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "users", description = "Demo login and user lookup"),
        (name = "plantations", description = "Plantation submission and verification"),
        (name = "credits", description = "Marketplace listings and purchases"),
        (name = "transactions", description = "Public ledger and statistics"),
        (name = "health", description = "Health probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi as _;

    use super::*;

    #[test]
    fn document_contains_every_api_path() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/login",
            "/api/user/{id}",
            "/api/plantations",
            "/api/plantations/ngo/{ngoId}",
            "/api/plantations/pending",
            "/api/plantations/{id}/verify",
            "/api/plantations/{id}/reject",
            "/api/credits/available",
            "/api/credits/owner/{ownerId}",
            "/api/credits/{id}/purchase",
            "/api/transactions",
            "/api/transactions/user/{userId}",
            "/api/stats",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("Error"));
        assert!(schemas.contains_key("MarketplaceStats"));
    }
}
