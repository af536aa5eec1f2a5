//! Port for the attendance ledger and its atomic sign-out commit.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::attendance::{Entry, MemberId, SeasonId};

/// Errors raised by ledger adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryRepositoryError {
    /// Repository connection could not be established.
    #[error("ledger connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("ledger query failed: {message}")]
    Query { message: String },

    /// A concurrent writer closed the entry first; nothing was persisted.
    #[error("ledger write conflicted: {message}")]
    Conflict { message: String },
}

impl EntryRepositoryError {
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

    /// Create a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// The grouped write closing one entry and moving both running totals.
///
/// `time_out_ms` and `total_ms` come from a single clock read in the
/// coordinator; adapters persist them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutTally {
    /// Ledger entry being closed.
    pub entry_id: Uuid,
    /// Member whose per-season total receives the delta.
    pub member_id: MemberId,
    /// Season whose organisation-wide total receives the delta.
    pub season_id: SeasonId,
    /// Epoch milliseconds written to the entry's `time_out`.
    pub time_out_ms: i64,
    /// Elapsed milliseconds added to both aggregates.
    pub total_ms: i64,
}

/// Port for ledger writes and reads.
///
/// `commit_sign_out` is the transactional heart of the system: adapters
/// must apply the entry close and both aggregate increments as one atomic
/// unit, isolated from concurrent sign-outs that share the season
/// aggregate. Everything else is a plain read or single-document write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Append a freshly opened entry to the ledger.
    ///
    /// No uniqueness check happens here; callers guard the one-open-entry
    /// invariant before inserting.
    async fn insert(&self, entry: &Entry) -> Result<(), EntryRepositoryError>;

    /// Find the open entry for a (member, season) pair, if any.
    async fn find_open(
        &self,
        member_id: &MemberId,
        season_id: &SeasonId,
    ) -> Result<Option<Entry>, EntryRepositoryError>;

    /// List entries, newest sign-in first, optionally filtered by season
    /// and open-state.
    async fn find_all(
        &self,
        season_id: Option<SeasonId>,
        active_only: bool,
    ) -> Result<Vec<Entry>, EntryRepositoryError>;

    /// Atomically close the entry and add the tally to the member's and the
    /// season's running totals.
    ///
    /// The season aggregate is created with the delta when missing and
    /// incremented otherwise, inside the same atomic unit. Returns
    /// [`EntryRepositoryError::Conflict`] — with no partial state persisted —
    /// when the entry is no longer open.
    async fn commit_sign_out(&self, tally: &SignOutTally) -> Result<(), EntryRepositoryError>;

    /// Close the entry without tallying: `time_out = -1`, `total = 0`.
    ///
    /// Single-document write; neither aggregate is touched. Returns
    /// [`EntryRepositoryError::Conflict`] when the entry is no longer open.
    async fn forfeit(&self, entry_id: Uuid) -> Result<(), EntryRepositoryError>;
}
