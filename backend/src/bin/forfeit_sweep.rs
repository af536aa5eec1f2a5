//! Daily forced sign-out: forfeit every still-open ledger entry.
//!
//! Invoked by an external scheduler (cron) once a day, after hours. Members
//! who forgot to sign out lose the dangling time rather than accruing it;
//! each member is processed independently so one failure never aborts the
//! batch.

use std::sync::Arc;

use backend::domain::attendance::SeasonId;
use backend::domain::ports::SharedSeasonProvider;
use backend::domain::{AttendanceCommandService, AttendanceQueryService, ForfeitSweep};
use backend::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselEntryRepository, DieselSeasonRepository, PoolConfig,
};
use backend::server::AppSettings;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig as _;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// `forfeit-sweep` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "forfeit-sweep",
    about = "Forfeit all open attendance entries without tallying their time",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `KIOSK_DATABASE_URL` when
    /// omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        tracing::warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let settings = AppSettings::load().wrap_err("load settings")?;

    let database_url = args
        .database_url
        .or(settings.database_url.clone())
        .ok_or_else(|| eyre!("database URL required (--database-url or KIOSK_DATABASE_URL)"))?;
    let active_season = SeasonId::new(
        settings
            .require_season()
            .map_err(|message| eyre!(message))?,
    )
    .wrap_err("invalid KIOSK_SEASON")?;

    let db_pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(settings.pool_size))
        .await
        .wrap_err("build database pool")?;

    let ledger = Arc::new(DieselEntryRepository::new(db_pool.clone()));
    let accounts = Arc::new(DieselAccountRepository::new(db_pool.clone()));
    let seasons = Arc::new(DieselSeasonRepository::new(db_pool));
    let season_provider = Arc::new(SharedSeasonProvider::new(active_season));

    let commands = AttendanceCommandService::new(
        Arc::clone(&ledger),
        Arc::clone(&accounts),
        Arc::clone(&season_provider),
        Arc::new(DefaultClock),
    );
    let queries = AttendanceQueryService::new(ledger, accounts, seasons, season_provider);

    let sweep = ForfeitSweep::new(Arc::new(commands), Arc::new(queries));
    let outcome = sweep.run().await.wrap_err("forfeit sweep failed")?;

    info!(
        forfeited = outcome.forfeited,
        failed = outcome.failed,
        "forfeit sweep completed"
    );
    if outcome.failed > 0 {
        return Err(eyre!("{} member(s) failed to forfeit", outcome.failed));
    }
    Ok(())
}
