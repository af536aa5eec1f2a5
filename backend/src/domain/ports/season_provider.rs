//! Port supplying the active season id.
//!
//! The kiosk's configuration dialog can change the active season while the
//! process runs, so services re-read this port per operation instead of
//! capturing the season at startup.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::attendance::SeasonId;

/// Errors raised by season provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeasonProviderError {
    /// The provider could not resolve an active season.
    #[error("active season unavailable: {message}")]
    Unavailable { message: String },
}

impl SeasonProviderError {
    /// Create an unavailable error with the given message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Port resolving the currently active season.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonProvider: Send + Sync {
    /// Resolve the active season. Called once per operation; never cached
    /// across operations by consumers.
    async fn active_season(&self) -> Result<SeasonId, SeasonProviderError>;
}

/// Process-local season provider backed by a shared handle.
///
/// Seeded from configuration at startup; `set` lets an admin surface swap
/// the season without a restart.
#[derive(Debug)]
pub struct SharedSeasonProvider {
    current: RwLock<SeasonId>,
}

impl SharedSeasonProvider {
    /// Create a provider seeded with the configured season.
    pub fn new(initial: SeasonId) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Replace the active season.
    pub fn set(&self, season_id: SeasonId) -> Result<(), SeasonProviderError> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| SeasonProviderError::unavailable("season handle poisoned"))?;
        *guard = season_id;
        Ok(())
    }
}

#[async_trait]
impl SeasonProvider for SharedSeasonProvider {
    async fn active_season(&self) -> Result<SeasonId, SeasonProviderError> {
        let guard = self
            .current
            .read()
            .map_err(|_| SeasonProviderError::unavailable("season handle poisoned"))?;
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    fn season(raw: &str) -> SeasonId {
        SeasonId::new(raw).expect("valid season id")
    }

    #[tokio::test]
    async fn shared_provider_returns_seeded_season() {
        let provider = SharedSeasonProvider::new(season("2024"));
        let active = provider.active_season().await.expect("season resolves");
        assert_eq!(active, season("2024"));
    }

    #[tokio::test]
    async fn set_swaps_the_active_season() {
        let provider = SharedSeasonProvider::new(season("2024"));
        provider.set(season("2025")).expect("swap succeeds");
        let active = provider.active_season().await.expect("season resolves");
        assert_eq!(active, season("2025"));
    }
}
