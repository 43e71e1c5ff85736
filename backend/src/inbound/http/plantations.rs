//! Plantation endpoints: submission, listings, and the admin decisions.
//!
//! ```text
//! POST  /api/plantations
//! GET   /api/plantations/ngo/{ngoId}
//! GET   /api/plantations/pending
//! PATCH /api/plantations/{id}/verify
//! PATCH /api/plantations/{id}/reject
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::plantation::Plantation;
use crate::domain::ports::{
    SubmitPlantationRequest, VerifyPlantationOutcome, VerifyPlantationRequest,
};
use crate::domain::user::Role;
use crate::domain::Error;
use crate::inbound::http::auth::{require_role, require_self_or_admin, require_user};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_decimal, parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request payload for a plantation submission.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPlantationBody {
    /// Must match the signed-in NGO.
    pub ngo_id: String,
    #[schema(example = 500)]
    pub mangrove_count: i32,
    #[schema(example = "1.3521")]
    pub latitude: String,
    #[schema(example = "103.8198")]
    pub longitude: String,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// Request payload for verifying a plantation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPlantationBody {
    /// Accepted for wire compatibility; must match the signed-in admin when
    /// present. The verification is always recorded against the session
    /// user.
    pub verified_by: Option<String>,
}

/// Submit a new plantation claim for the signed-in NGO.
#[utoipa::path(
    post,
    path = "/api/plantations",
    request_body = SubmitPlantationBody,
    responses(
        (status = 200, description = "Created plantation, pending verification", body = Plantation),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an NGO, or submitting for another NGO", body = Error)
    ),
    tags = ["plantations"],
    operation_id = "submitPlantation",
    security(("SessionCookie" = []))
)]
#[post("/plantations")]
pub async fn submit_plantation(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitPlantationBody>,
) -> ApiResult<web::Json<Plantation>> {
    let actor = require_user(&state, &session).await?;
    require_role(&actor, Role::Ngo)?;

    let body = payload.into_inner();
    let ngo_id = parse_uuid(&body.ngo_id, FieldName::new("ngoId"))?;
    if ngo_id != actor.id {
        return Err(Error::forbidden(
            "plantations may only be submitted for the signed-in organisation",
        ));
    }

    let plantation = state
        .commands
        .submit_plantation(SubmitPlantationRequest {
            ngo_id,
            mangrove_count: body.mangrove_count,
            latitude: parse_decimal(&body.latitude, FieldName::new("latitude"))?,
            longitude: parse_decimal(&body.longitude, FieldName::new("longitude"))?,
            notes: body.notes,
            image_url: body.image_url,
        })
        .await?;

    Ok(web::Json(plantation))
}

/// List an NGO's plantations, newest first.
#[utoipa::path(
    get,
    path = "/api/plantations/ngo/{ngoId}",
    params(("ngoId" = String, Path, description = "NGO user id")),
    responses(
        (status = 200, description = "Plantations", body = [Plantation]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner or an admin", body = Error)
    ),
    tags = ["plantations"],
    operation_id = "listPlantationsForNgo",
    security(("SessionCookie" = []))
)]
#[get("/plantations/ngo/{ngo_id}")]
pub async fn list_plantations_for_ngo(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Plantation>>> {
    let actor = require_user(&state, &session).await?;
    let ngo_id = parse_uuid(&path.into_inner(), FieldName::new("ngoId"))?;
    require_self_or_admin(&actor, ngo_id)?;

    let plantations = state.queries.plantations_for_ngo(ngo_id).await?;
    Ok(web::Json(plantations))
}

/// List the admin verification queue, newest first.
#[utoipa::path(
    get,
    path = "/api/plantations/pending",
    responses(
        (status = 200, description = "Pending plantations", body = [Plantation]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["plantations"],
    operation_id = "pendingPlantations",
    security(("SessionCookie" = []))
)]
#[get("/plantations/pending")]
pub async fn pending_plantations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Plantation>>> {
    let actor = require_user(&state, &session).await?;
    require_role(&actor, Role::Admin)?;

    let plantations = state.queries.pending_plantations().await?;
    Ok(web::Json(plantations))
}

/// Verify a pending plantation, minting its credits.
#[utoipa::path(
    patch,
    path = "/api/plantations/{id}/verify",
    params(("id" = String, Path, description = "Plantation id")),
    request_body = VerifyPlantationBody,
    responses(
        (status = 200, description = "Verified plantation with minted credit and ledger entry",
            body = VerifyPlantationOutcome),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Plantation not found", body = Error),
        (status = 409, description = "Plantation already decided", body = Error)
    ),
    tags = ["plantations"],
    operation_id = "verifyPlantation",
    security(("SessionCookie" = []))
)]
#[patch("/plantations/{id}/verify")]
pub async fn verify_plantation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VerifyPlantationBody>,
) -> ApiResult<web::Json<VerifyPlantationOutcome>> {
    let actor = require_user(&state, &session).await?;
    require_role(&actor, Role::Admin)?;

    let plantation_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    if let Some(raw) = payload.into_inner().verified_by {
        let verified_by = parse_uuid(&raw, FieldName::new("verifiedBy"))?;
        if verified_by != actor.id {
            return Err(Error::forbidden(
                "verifications are recorded against the signed-in admin",
            ));
        }
    }

    let outcome = state
        .commands
        .verify_plantation(VerifyPlantationRequest {
            plantation_id,
            verified_by: actor.id,
        })
        .await?;

    Ok(web::Json(outcome))
}

/// Reject a pending plantation.
#[utoipa::path(
    patch,
    path = "/api/plantations/{id}/reject",
    params(("id" = String, Path, description = "Plantation id")),
    responses(
        (status = 200, description = "Rejected plantation", body = Plantation),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Plantation not found", body = Error),
        (status = 409, description = "Plantation already decided", body = Error)
    ),
    tags = ["plantations"],
    operation_id = "rejectPlantation",
    security(("SessionCookie" = []))
)]
#[patch("/plantations/{id}/reject")]
pub async fn reject_plantation(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Plantation>> {
    let actor = require_user(&state, &session).await?;
    require_role(&actor, Role::Admin)?;

    let plantation_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let plantation = state.commands.reject_plantation(plantation_id).await?;
    Ok(web::Json(plantation))
}
