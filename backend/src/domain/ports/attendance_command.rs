//! Driving port for kiosk mutations: sign-in, sign-out, account creation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::attendance::{
    Account, Entry, EntryValidationError, MemberId, SeasonId,
};

/// Serializable ledger entry payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub id: Uuid,
    pub member_id: MemberId,
    pub season_id: SeasonId,
    pub time_in_ms: i64,
    pub time_out_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ms: Option<i64>,
}

impl From<Entry> for EntryPayload {
    fn from(value: Entry) -> Self {
        Self {
            id: value.id(),
            member_id: value.member_id().clone(),
            season_id: value.season_id().clone(),
            time_in_ms: value.time_in_ms(),
            time_out_ms: value.time_out_ms(),
            total_ms: value.total_ms(),
        }
    }
}

impl TryFrom<EntryPayload> for Entry {
    type Error = EntryValidationError;

    fn try_from(value: EntryPayload) -> Result<Self, Self::Error> {
        Self::from_parts(
            value.id,
            value.member_id,
            value.season_id,
            value.time_in_ms,
            value.time_out_ms,
            value.total_ms,
        )
    }
}

/// Serializable account payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub id: MemberId,
    pub name: String,
    pub seasons: BTreeMap<SeasonId, i64>,
}

impl From<Account> for AccountPayload {
    fn from(value: Account) -> Self {
        Self {
            id: value.id().clone(),
            name: value.name().to_string(),
            seasons: value.seasons().clone(),
        }
    }
}

/// Request to open a ledger entry for a member in the active season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub member_id: MemberId,
}

/// Response from signing in: the freshly opened entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub entry: EntryPayload,
}

/// Request to close the member's open entry in the active season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutRequest {
    pub member_id: MemberId,
}

/// Response from signing out: the closed entry, including its tallied total,
/// assembled without a store re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutResponse {
    pub entry: EntryPayload,
}

/// Request to create an account and sign the new member in immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub member_id: MemberId,
    pub name: String,
}

/// Response from account creation: the account plus the opened entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub account: AccountPayload,
    pub entry: EntryPayload,
}

/// Driving port for kiosk write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendanceCommand: Send + Sync {
    /// Open a ledger entry for the member in the active season.
    ///
    /// Re-validates the one-open-entry invariant against the store
    /// immediately before inserting; an advisory dispatch result is never
    /// trusted for the write decision.
    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, Error>;

    /// Close the member's open entry and tally both running totals
    /// atomically.
    ///
    /// Fails with [`crate::domain::ErrorCode::NoOpenEntry`] when the member
    /// is not signed in; no partial state is persisted on any failure.
    async fn sign_out(&self, request: SignOutRequest) -> Result<SignOutResponse, Error>;

    /// Create an account and immediately sign the member in.
    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<CreateAccountResponse, Error>;

    /// Close the member's open entry in the given season without tallying.
    ///
    /// Administrative path used by the scheduled sweep; touches the entry
    /// only, never the aggregates.
    async fn forfeit_open_entry(
        &self,
        member_id: &MemberId,
        season_id: &SeasonId,
    ) -> Result<EntryPayload, Error>;
}
