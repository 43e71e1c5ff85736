//! User endpoints: demo login and user lookup.
//!
//! ```text
//! POST /api/login {"username":"mangrove_ngo","role":"ngo"}
//! GET  /api/user/{id}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::user::{Role, User};
use crate::domain::Error;
use crate::inbound::http::auth::require_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request payload for the demo login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    /// Informational only; the demo login resolves the seeded user by role.
    pub username: String,
    /// One of `ngo`, `buyer`, `admin`.
    pub role: String,
}

/// Response payload for the demo login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponseBody {
    /// The signed-in user.
    pub user: User,
}

/// Demo login: resolve the seeded user for a role and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Login success", body = LoginResponseBody,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No user for the requested role", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<LoginResponseBody>> {
    let body = payload.into_inner();
    let role: Role = body.role.parse().map_err(|_| {
        Error::invalid_request("role must be ngo, buyer, or admin")
            .with_details(json!({ "field": "role", "value": body.role }))
    })?;

    let user = state.queries.login(role).await?;
    session.persist_user(user.id)?;
    info!(username = %body.username, role = %user.role, user_id = %user.id, "demo login");

    Ok(web::Json(LoginResponseBody { user }))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("SessionCookie" = []))
)]
#[get("/user/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    require_user(&state, &session).await?;
    let user_id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let user = state.queries.user(user_id).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use serde_json::Value;
    use std::sync::Arc;

    use super::*;
    use crate::domain::user::Username;
    use crate::domain::ports::{MockMarketplaceCommand, MockMarketplaceQuery};
    use crate::inbound::http::test_utils::test_session_middleware;

    fn demo_user(role: Role) -> User {
        User::new(
            Username::new("mangrove_ngo").expect("valid username"),
            role,
            Some("Mangrove Conservation NGO".to_owned()),
        )
    }

    fn test_app(
        queries: MockMarketplaceQuery,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = HttpState::new(
            Arc::new(MockMarketplaceCommand::new()),
            Arc::new(queries),
        );
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api")
                .wrap(test_session_middleware())
                .service(login)
                .service(get_user),
        )
    }

    #[actix_web::test]
    async fn login_establishes_session_and_returns_user() {
        let user = demo_user(Role::Ngo);
        let expected_id = user.id;
        let mut queries = MockMarketplaceQuery::new();
        queries
            .expect_login()
            .return_once(move |_| Ok(user));

        let app = actix_test::init_service(test_app(queries)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(serde_json::json!({ "username": "mangrove_ngo", "role": "ngo" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            res.response()
                .cookies()
                .any(|cookie| cookie.name() == "session")
        );
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["user"]["id"], expected_id.to_string());
        assert_eq!(value["user"]["role"], "ngo");
        assert_eq!(
            value["user"]["organizationName"],
            "Mangrove Conservation NGO"
        );
    }

    #[actix_web::test]
    async fn login_rejects_unknown_role() {
        let app = actix_test::init_service(test_app(MockMarketplaceQuery::new())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(serde_json::json!({ "username": "x", "role": "superuser" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let value: Value = actix_test::read_body_json(res).await;
        assert_eq!(value["code"], "invalid_request");
        assert_eq!(value["details"]["field"], "role");
    }

    #[actix_web::test]
    async fn get_user_requires_session() {
        let app = actix_test::init_service(test_app(MockMarketplaceQuery::new())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/user/{}", uuid::Uuid::new_v4()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
