//! Backend entry-point: wires configuration, the ledger store, the demo
//! seed, and the HTTP server.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use ecoledger::inbound::http::health::HealthState;
use ecoledger::outbound::persistence::{DbPool, PoolConfig};
use ecoledger::seed;

use server::{build_services, create_server, ServerConfig};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn bind_addr() -> std::io::Result<SocketAddr> {
    let raw = env::var("ECOLEDGER_BIND").unwrap_or_else(|_| DEFAULT_BIND.into());
    raw.parse()
        .map_err(|e| std::io::Error::other(format!("invalid ECOLEDGER_BIND {raw}: {e}")))
}

async fn database_pool() -> std::io::Result<Option<DbPool>> {
    let Ok(url) = env::var("DATABASE_URL") else {
        return Ok(None);
    };
    let pool = DbPool::new(PoolConfig::new(url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
    Ok(Some(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr()?)
        .with_db_pool(database_pool().await?);
    let services = build_services(&config);

    let seed_enabled = env::var("ECOLEDGER_SEED_DEMO_DATA")
        .map(|v| v != "0")
        .unwrap_or(true);
    if seed_enabled {
        match seed::seed_demo_data(&services.store, services.http_state.commands.as_ref()).await {
            Ok(outcome) => info!(?outcome, "demo seed checked"),
            Err(e) => error!(error = %e, "demo seed failed; continuing without sample data"),
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config, &services)?;
    server.await
}
