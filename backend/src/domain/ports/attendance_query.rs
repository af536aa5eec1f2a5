//! Driving port for kiosk reads: dispatch, hours, roster, and listings.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::attendance::{MemberId, SeasonId, SeasonTotal};

use super::attendance_command::{AccountPayload, EntryPayload};

/// The next kiosk action for a member, decided by the dispatch helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// An open entry exists; the member should sign out.
    SignOut,
    /// An account exists but no open entry; the member should sign in.
    SignIn,
    /// Neither exists; the kiosk should collect a name and create the
    /// account (which signs the member in immediately).
    CreateAccount,
}

/// Dispatch decision plus the records it was based on.
///
/// Advisory only: kiosk input is debounced, so this snapshot may be stale
/// by the time the member confirms. The command port re-validates
/// authoritative state before committing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextActionResponse {
    pub action: NextAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_entry: Option<EntryPayload>,
}

/// A member's accumulated hours, per season and for the active season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberHoursResponse {
    pub member_id: MemberId,
    pub active_season: SeasonId,
    pub active_season_ms: i64,
    pub seasons: BTreeMap<SeasonId, i64>,
}

/// One season's organisation-wide running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTotalPayload {
    pub id: SeasonId,
    pub total_ms: i64,
}

impl From<SeasonTotal> for SeasonTotalPayload {
    fn from(value: SeasonTotal) -> Self {
        Self {
            id: value.id().clone(),
            total_ms: value.total_ms(),
        }
    }
}

/// Driving port for kiosk read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceQuery: Send + Sync {
    /// Decide the member's next action by fetching the open entry and the
    /// account concurrently.
    async fn next_action(&self, member_id: &MemberId) -> Result<NextActionResponse, Error>;

    /// Read a member's accumulated hours across seasons.
    async fn member_hours(&self, member_id: &MemberId) -> Result<MemberHoursResponse, Error>;

    /// List accounts, optionally only members with tallied time in the
    /// given season (the roster behind spreadsheet export).
    async fn list_accounts(
        &self,
        with_hours_in: Option<SeasonId>,
    ) -> Result<Vec<AccountPayload>, Error>;

    /// List ledger entries, newest first, with optional season and
    /// open-state filters.
    async fn list_entries(
        &self,
        season_id: Option<SeasonId>,
        active_only: bool,
    ) -> Result<Vec<EntryPayload>, Error>;

    /// Read one season's running total; absent seasons are a not-found.
    async fn season_total(&self, season_id: &SeasonId) -> Result<SeasonTotalPayload, Error>;

    /// List every season with recorded time.
    async fn list_seasons(&self) -> Result<Vec<SeasonTotalPayload>, Error>;
}
