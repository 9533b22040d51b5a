//! Backend entry-point: loads configuration, picks the credential store and
//! starts the HTTP server.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use travel_auth::config::{GoogleOAuthSettings, ServerSettings};
use travel_auth::domain::ports::CredentialStore;
use travel_auth::inbound::http::health::HealthState;
use travel_auth::inbound::http::session_config::{BuildMode, session_settings_from_env};
use travel_auth::outbound::crypto::BcryptPasswordHasher;
use travel_auth::outbound::memory::InMemoryCredentialStore;
use travel_auth::outbound::persistence::{
    DbPool, DieselCredentialStore, PoolConfig, run_pending_migrations,
};

fn startup_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

async fn build_store(settings: &ServerSettings) -> std::io::Result<Arc<dyn CredentialStore>> {
    let Some(database_url) = settings.database_url() else {
        warn!("no database configured; accounts are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryCredentialStore::new()));
    };

    run_pending_migrations(database_url)
        .await
        .map_err(|e| startup_error("database migration failed", e))?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| startup_error("database pool setup failed", e))?;
    info!("credential store backed by PostgreSQL");
    Ok(Arc::new(DieselCredentialStore::new(pool)))
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

    let settings =
        ServerSettings::load().map_err(|e| startup_error("invalid server configuration", e))?;
    // OAuth secrets are read from the environment or config file only.
    let program = std::env::args_os()
        .next()
        .unwrap_or_else(|| OsString::from("travel-auth"));
    let google = GoogleOAuthSettings::load_from_iter([program])
        .map_err(|e| startup_error("invalid Google OAuth configuration", e))?
        .to_oauth_config()
        .map_err(|e| startup_error("invalid Google OAuth configuration", e))?;

    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| startup_error("invalid session configuration", e))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| startup_error("invalid server configuration", e))?;
    let hasher = BcryptPasswordHasher::new(settings.bcrypt_cost)
        .map_err(|e| startup_error("invalid server configuration", e))?;
    let store = build_store(&settings).await?;

    let config = ServerConfig::new(session, bind_addr, store, Arc::new(hasher))
        .with_login_path(settings.login_path())
        .with_store_timeout(settings.store_timeout())
        .with_google(google);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
