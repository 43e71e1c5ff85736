//! Ledger endpoints: the public ledger, per-user history, and stats.
//!
//! The full ledger and the aggregate counters back the public ledger page,
//! so they are served without a session.
//!
//! ```text
//! GET /api/transactions
//! GET /api/transactions/user/{userId}
//! GET /api/stats
//! ```

use actix_web::{get, web};

use crate::domain::ledger_entry::LedgerEntry;
use crate::domain::ports::{LedgerEntryView, MarketplaceStats};
use crate::domain::Error;
use crate::inbound::http::auth::{require_self_or_admin, require_user};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Read the full ledger, newest first, with party attribution.
#[utoipa::path(
    get,
    path = "/api/transactions",
    responses(
        (status = 200, description = "Ledger entries with from/to attribution",
            body = [LedgerEntryView])
    ),
    tags = ["transactions"],
    operation_id = "listTransactions",
    security([])
)]
#[get("/transactions")]
pub async fn list_transactions(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<LedgerEntryView>>> {
    let views = state.queries.ledger().await?;
    Ok(web::Json(views))
}

/// Read a user's ledger history (entries sent or received).
#[utoipa::path(
    get,
    path = "/api/transactions/user/{userId}",
    params(("userId" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntry]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owner or an admin", body = Error)
    ),
    tags = ["transactions"],
    operation_id = "transactionsForUser",
    security(("SessionCookie" = []))
)]
#[get("/transactions/user/{user_id}")]
pub async fn transactions_for_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<LedgerEntry>>> {
    let actor = require_user(&state, &session).await?;
    let user_id = parse_uuid(&path.into_inner(), FieldName::new("userId"))?;
    require_self_or_admin(&actor, user_id)?;

    let entries = state.queries.ledger_for_user(user_id).await?;
    Ok(web::Json(entries))
}

/// Aggregate dashboard counters.
#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Marketplace counters", body = MarketplaceStats)
    ),
    tags = ["transactions"],
    operation_id = "stats",
    security([])
)]
#[get("/stats")]
pub async fn stats(state: web::Data<HttpState>) -> ApiResult<web::Json<MarketplaceStats>> {
    let counters = state.queries.stats().await?;
    Ok(web::Json(counters))
}
