//! HTTP inbound adapter exposing the REST endpoints.
//!
//! All marketplace endpoints live under the `/api` scope; health probes are
//! mounted at the root. [`configure_api`] registers the scope's services so
//! the server and the integration tests share one routing table.

use actix_web::web;

pub mod auth;
pub mod credits;
pub mod error;
pub mod health;
pub mod plantations;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod transactions;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api` endpoint on the given service config.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::get_user)
        .service(plantations::submit_plantation)
        .service(plantations::list_plantations_for_ngo)
        .service(plantations::pending_plantations)
        .service(plantations::verify_plantation)
        .service(plantations::reject_plantation)
        .service(credits::available_credits)
        .service(credits::credits_for_owner)
        .service(credits::purchase_credit)
        .service(transactions::list_transactions)
        .service(transactions::transactions_for_user)
        .service(transactions::stats);
}
