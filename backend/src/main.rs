//! Backend entry-point: runs migrations and serves the kiosk REST API.

use std::io;
use std::net::SocketAddr;

use backend::domain::attendance::SeasonId;
use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{self, AppSettings, ServerConfig};
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Bring the schema up to date before accepting traffic.
fn run_migrations(database_url: &str) -> io::Result<()> {
    let mut conn = PgConnection::establish(database_url).map_err(io::Error::other)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| io::Error::other(err.to_string()))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(io::Error::other)?;
    let database_url = settings
        .require_database_url()
        .map_err(io::Error::other)?
        .to_owned();
    let active_season = SeasonId::new(settings.require_season().map_err(io::Error::other)?)
        .map_err(io::Error::other)?;
    let bind_addr: SocketAddr = settings
        .bind_addr
        .parse()
        .map_err(|err| io::Error::other(format!("invalid bind address: {err}")))?;

    {
        let database_url = database_url.clone();
        tokio::task::spawn_blocking(move || run_migrations(&database_url))
            .await
            .map_err(io::Error::other)??;
    }

    let db_pool = DbPool::new(
        PoolConfig::new(&database_url).with_max_size(settings.pool_size),
    )
    .await
    .map_err(io::Error::other)?;

    info!(%bind_addr, season = %active_season, "starting attendance backend");
    server::run(ServerConfig {
        bind_addr,
        db_pool,
        active_season,
    })
    .await
}
