//! Credit endpoints: marketplace listing, holdings, and purchase.
//!
//! ```text
//! GET  /api/credits/available
//! GET  /api/credits/owner/{ownerId}
//! POST /api/credits/{id}/purchase
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::credit::Credit;
use crate::domain::ports::{CreditListing, PurchaseCreditOutcome, PurchaseCreditRequest};
use crate::domain::user::Role;
use crate::domain::Error;
use crate::inbound::http::auth::{require_role, require_self_or_admin, require_user};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request payload for a credit purchase.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCreditBody {
    /// Must match the signed-in buyer.
    pub buyer_id: String,
}

/// List available credit blocks for the marketplace page.
#[utoipa::path(
    get,
    path = "/api/credits/available",
    responses(
        (status = 200, description = "Available credits with NGO and plantation attribution",
            body = [CreditListing]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["credits"],
    operation_id = "availableCredits",
    security(("SessionCookie" = []))
)]
#[get("/credits/available")]
pub async fn available_credits(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CreditListing>>> {
    require_user(&state, &session).await?;
    let listings = state.queries.available_credits().await?;
    Ok(web::Json(listings))
}

/// List credit blocks owned by a user, newest first.
#[utoipa::path(
    get,
    path = "/api/credits/owner/{ownerId}",
    params(("ownerId" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Owned credits", body = [Credit]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner or an admin", body = Error)
    ),
    tags = ["credits"],
    operation_id = "creditsForOwner",
    security(("SessionCookie" = []))
)]
#[get("/credits/owner/{owner_id}")]
pub async fn credits_for_owner(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Credit>>> {
    let actor = require_user(&state, &session).await?;
    let owner_id = parse_uuid(&path.into_inner(), FieldName::new("ownerId"))?;
    require_self_or_admin(&actor, owner_id)?;

    let credits = state.queries.credits_for_owner(owner_id).await?;
    Ok(web::Json(credits))
}

/// Purchase an available credit block in full.
#[utoipa::path(
    post,
    path = "/api/credits/{id}/purchase",
    params(("id" = String, Path, description = "Credit id")),
    request_body = PurchaseCreditBody,
    responses(
        (status = 200, description = "Transferred credit with ledger entry",
            body = PurchaseCreditOutcome),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a buyer, or purchasing for another user", body = Error),
        (status = 404, description = "Credit not found", body = Error),
        (status = 409, description = "Credit not available for purchase", body = Error)
    ),
    tags = ["credits"],
    operation_id = "purchaseCredit",
    security(("SessionCookie" = []))
)]
#[post("/credits/{id}/purchase")]
pub async fn purchase_credit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PurchaseCreditBody>,
) -> ApiResult<web::Json<PurchaseCreditOutcome>> {
    let actor = require_user(&state, &session).await?;
    require_role(&actor, Role::Buyer)?;

    let credit_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let buyer_id = parse_uuid(&payload.into_inner().buyer_id, FieldName::new("buyerId"))?;
    if buyer_id != actor.id {
        return Err(Error::forbidden(
            "credits may only be purchased for the signed-in buyer",
        ));
    }

    let outcome = state
        .commands
        .purchase_credit(PurchaseCreditRequest {
            credit_id,
            buyer_id,
        })
        .await?;

    Ok(web::Json(outcome))
}
