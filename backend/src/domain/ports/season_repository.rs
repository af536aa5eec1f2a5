//! Port for reading organisation-wide season aggregates.

use async_trait::async_trait;

use crate::domain::attendance::{SeasonId, SeasonTotal};

/// Errors raised by season repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeasonRepositoryError {
    /// Repository connection could not be established.
    #[error("season repository connection failed: {message}")]
    Connection { message: String },

    /// Query failed during execution.
    #[error("season repository query failed: {message}")]
    Query { message: String },
}

impl SeasonRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read-only port for season aggregates.
///
/// Writes happen exclusively inside the ledger's sign-out commit; exposing
/// them here would invite increments outside the transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeasonRepository: Send + Sync {
    /// Find one season's running total, `None` before its first sign-out.
    async fn find_by_id(
        &self,
        season_id: &SeasonId,
    ) -> Result<Option<SeasonTotal>, SeasonRepositoryError>;

    /// List every season aggregate recorded so far.
    async fn list(&self) -> Result<Vec<SeasonTotal>, SeasonRepositoryError>;
}
