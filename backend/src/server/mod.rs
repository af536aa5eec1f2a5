//! Server construction and wiring.
//!
//! Builds the Diesel-backed services behind the kiosk driving ports and
//! mounts the HTTP adapter. Swagger UI is exposed in debug builds only.

mod config;

pub use config::AppSettings;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::attendance::SeasonId;
use crate::domain::ports::SharedSeasonProvider;
use crate::domain::{AttendanceCommandService, AttendanceQueryService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::kiosk;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselEntryRepository, DieselSeasonRepository,
};

/// Server wiring inputs.
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Database connection pool shared by all adapters.
    pub db_pool: DbPool,
    /// Season members currently sign in against.
    pub active_season: SeasonId,
}

/// Build the HTTP state from Diesel-backed services.
pub fn build_http_state(db_pool: &DbPool, active_season: SeasonId) -> HttpState {
    let ledger = Arc::new(DieselEntryRepository::new(db_pool.clone()));
    let accounts = Arc::new(DieselAccountRepository::new(db_pool.clone()));
    let seasons = Arc::new(DieselSeasonRepository::new(db_pool.clone()));
    let season_provider = Arc::new(SharedSeasonProvider::new(active_season));

    let commands = AttendanceCommandService::new(
        Arc::clone(&ledger),
        Arc::clone(&accounts),
        Arc::clone(&season_provider),
        Arc::new(DefaultClock),
    );
    let queries = AttendanceQueryService::new(ledger, accounts, seasons, season_provider);

    HttpState::new(Arc::new(commands), Arc::new(queries))
}

/// Build the actix application with all kiosk routes mounted.
pub fn build_app(
    state: HttpState,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(web::Data::new(state))
        .app_data(health_state)
        .service(live)
        .service(ready)
        .service(
            web::scope("/api/v1")
                .service(kiosk::next_action)
                .service(kiosk::sign_in)
                .service(kiosk::sign_out)
                .service(kiosk::create_account)
                .service(kiosk::list_accounts)
                .service(kiosk::member_hours)
                .service(kiosk::list_entries)
                .service(kiosk::list_seasons)
                .service(kiosk::season_total),
        );

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    app
}

/// Run the HTTP server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let state = build_http_state(&config.db_pool, config.active_season);
    let health_state = web::Data::new(HealthState::new());

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
