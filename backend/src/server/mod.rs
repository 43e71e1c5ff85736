//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::warn;

use ecoledger::domain::ports::LedgerStore;
use ecoledger::domain::{MarketplaceCommandService, MarketplaceQueryService};
use ecoledger::inbound::http;
use ecoledger::inbound::http::health::{live, ready, HealthState};
use ecoledger::inbound::http::state::HttpState;
use ecoledger::outbound::persistence::{DieselLedgerStore, MemoryLedgerStore};
use ecoledger::Trace;
#[cfg(debug_assertions)]
use ecoledger::ApiDoc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Port implementations wired for the configured store.
pub struct AppServices {
    /// The ledger store itself, needed by the seed bootstrap.
    pub store: Arc<dyn LedgerStore>,
    /// HTTP handler state bundling the driving ports.
    pub http_state: HttpState,
}

/// Build the marketplace services for the configured store.
///
/// With a database pool the Diesel adapter is used; without one the server
/// falls back to the in-memory store, which loses all state on restart.
pub fn build_services(config: &ServerConfig) -> AppServices {
    match &config.db_pool {
        Some(pool) => {
            let store = Arc::new(DieselLedgerStore::new(pool.clone()));
            let http_state = HttpState::new(
                Arc::new(MarketplaceCommandService::new(Arc::clone(&store))),
                Arc::new(MarketplaceQueryService::new(Arc::clone(&store))),
            );
            AppServices {
                store,
                http_state,
            }
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory ledger store (demo mode)");
            let store = Arc::new(MemoryLedgerStore::new());
            let http_state = HttpState::new(
                Arc::new(MarketplaceCommandService::new(Arc::clone(&store))),
                Arc::new(MarketplaceQueryService::new(Arc::clone(&store))),
            );
            AppServices {
                store,
                http_state,
            }
        }
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .configure(http::configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the Actix HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    services: &AppServices,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(services.http_state.clone());
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
