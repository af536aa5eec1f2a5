//! Application configuration loaded via OrthoConfig.
//!
//! Values come from (in precedence order) CLI-style overrides, environment
//! variables prefixed with `KIOSK_`, and the config file. The active season
//! seeds the in-process season provider; everything else is fixed for the
//! process lifetime.

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Runtime settings for the attendance backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KIOSK")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Active season id members sign in against (e.g. `2024`).
    pub season: Option<String>,
    /// Bind address for the HTTP server.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    pub bind_addr: String,
    /// Maximum database pool size.
    #[ortho_config(default = 10)]
    pub pool_size: u32,
}

impl AppSettings {
    /// Return the configured database URL or a descriptive error.
    pub fn require_database_url(&self) -> Result<&str, String> {
        self.database_url
            .as_deref()
            .ok_or_else(|| "database URL missing: set KIOSK_DATABASE_URL".to_owned())
    }

    /// Return the configured active season or a descriptive error.
    pub fn require_season(&self) -> Result<&str, String> {
        self.season
            .as_deref()
            .ok_or_else(|| "active season missing: set KIOSK_SEASON".to_owned())
    }
}
