//! Port for member account persistence.

use async_trait::async_trait;

use crate::domain::attendance::{Account, MemberId, SeasonId};

/// Errors raised by account repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountRepositoryError {
    /// Repository connection could not be established.
    #[error("account repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("account repository query failed: {message}")]
    Query { message: String },

    /// An account with the same member id already exists.
    #[error("account {member_id} already exists")]
    AlreadyExists { member_id: String },
}

impl AccountRepositoryError {
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

    /// Create an already-exists error for the given member id.
    pub fn already_exists(member_id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            member_id: member_id.into(),
        }
    }
}

/// Port for reading and creating member accounts.
///
/// Per-season totals inside an account are mutated exclusively by the
/// sign-out transaction on the ledger port, never through this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by member id.
    async fn find_by_id(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Account>, AccountRepositoryError>;

    /// Persist a brand-new account; existing ids are a conflict, not an
    /// overwrite.
    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError>;

    /// List accounts, optionally restricted to members with tallied time in
    /// the given season.
    async fn list(
        &self,
        with_hours_in: Option<SeasonId>,
    ) -> Result<Vec<Account>, AccountRepositoryError>;
}
