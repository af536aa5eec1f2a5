//! Kiosk HTTP handlers.
//!
//! ```text
//! GET  /api/v1/kiosk/next-action?memberId=1001
//! POST /api/v1/kiosk/sign-in
//! POST /api/v1/kiosk/sign-out
//! POST /api/v1/kiosk/accounts
//! GET  /api/v1/kiosk/accounts
//! GET  /api/v1/kiosk/accounts/{member_id}/hours
//! GET  /api/v1/kiosk/entries
//! GET  /api/v1/kiosk/seasons/{season_id}
//! ```

use std::collections::BTreeMap;

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AccountPayload, CreateAccountRequest, EntryPayload, MemberHoursResponse, NextAction,
    NextActionResponse, SeasonTotalPayload, SignInRequest, SignOutRequest,
};
use crate::domain::{Error, MemberId, SeasonId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Ledger entry payload returned by kiosk endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub member_id: String,
    pub season_id: String,
    pub time_in_ms: i64,
    /// Epoch milliseconds, or `0` while open and `-1` when forfeited.
    pub time_out_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ms: Option<i64>,
}

impl From<EntryPayload> for EntryBody {
    fn from(value: EntryPayload) -> Self {
        Self {
            id: value.id.to_string(),
            member_id: value.member_id.to_string(),
            season_id: value.season_id.to_string(),
            time_in_ms: value.time_in_ms,
            time_out_ms: value.time_out_ms,
            total_ms: value.total_ms,
        }
    }
}

/// Account payload returned by kiosk endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountBody {
    pub id: String,
    pub name: String,
    /// Season id → accumulated milliseconds.
    pub seasons: BTreeMap<String, i64>,
}

impl From<AccountPayload> for AccountBody {
    fn from(value: AccountPayload) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            seasons: value
                .seasons
                .into_iter()
                .map(|(season_id, total_ms)| (season_id.to_string(), total_ms))
                .collect(),
        }
    }
}

/// Dispatch decision returned by the advisory lookup.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextActionBody {
    /// One of `sign_out`, `sign_in`, or `create_account`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_entry: Option<EntryBody>,
}

impl From<NextActionResponse> for NextActionBody {
    fn from(value: NextActionResponse) -> Self {
        let action = match value.action {
            NextAction::SignOut => "sign_out",
            NextAction::SignIn => "sign_in",
            NextAction::CreateAccount => "create_account",
        };
        Self {
            action: action.to_owned(),
            account: value.account.map(Into::into),
            open_entry: value.open_entry.map(Into::into),
        }
    }
}

/// A member's accumulated hours.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberHoursBody {
    pub member_id: String,
    pub active_season: String,
    pub active_season_ms: i64,
    /// Season id → accumulated milliseconds.
    pub seasons: BTreeMap<String, i64>,
}

impl From<MemberHoursResponse> for MemberHoursBody {
    fn from(value: MemberHoursResponse) -> Self {
        Self {
            member_id: value.member_id.to_string(),
            active_season: value.active_season.to_string(),
            active_season_ms: value.active_season_ms,
            seasons: value
                .seasons
                .into_iter()
                .map(|(season_id, total_ms)| (season_id.to_string(), total_ms))
                .collect(),
        }
    }
}

/// One season's organisation-wide total.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonTotalBody {
    pub id: String,
    pub total_ms: i64,
}

impl From<SeasonTotalPayload> for SeasonTotalBody {
    fn from(value: SeasonTotalPayload) -> Self {
        Self {
            id: value.id.to_string(),
            total_ms: value.total_ms,
        }
    }
}

/// Request body for sign-in and sign-out.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberActionRequestBody {
    pub member_id: String,
}

/// Request body for account creation.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequestBody {
    pub member_id: String,
    pub name: String,
}

/// Query parameters for the advisory dispatch lookup.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NextActionQuery {
    /// Member id as typed on the kiosk pad.
    pub member_id: String,
}

/// Query parameters for the roster listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    /// Restrict to members with tallied time in this season.
    pub season_id: Option<String>,
}

/// Query parameters for the ledger listing.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EntriesQuery {
    /// Restrict to one season.
    pub season_id: Option<String>,
    /// Only entries that are still open.
    #[serde(default)]
    pub active_only: bool,
}

fn parse_member_id(raw: String) -> Result<MemberId, Error> {
    MemberId::new(&raw).map_err(|err| {
        Error::invalid_request(format!("invalid memberId: {err}"))
            .with_details(json!({ "field": "memberId", "value": raw }))
    })
}

fn parse_season_id(raw: String) -> Result<SeasonId, Error> {
    SeasonId::new(&raw).map_err(|err| {
        Error::invalid_request(format!("invalid seasonId: {err}"))
            .with_details(json!({ "field": "seasonId", "value": raw }))
    })
}

fn parse_optional_season_id(raw: Option<String>) -> Result<Option<SeasonId>, Error> {
    raw.map(parse_season_id).transpose()
}

/// Advisory dispatch: decide whether the member signs in, signs out, or
/// creates an account.
///
/// The result may be stale by the time the member confirms (kiosk input is
/// debounced); the mutating endpoints re-validate before committing.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/next-action",
    params(NextActionQuery),
    responses(
        (status = 200, description = "Dispatch decision", body = NextActionBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "nextAction"
)]
#[get("/kiosk/next-action")]
pub async fn next_action(
    state: web::Data<HttpState>,
    query: web::Query<NextActionQuery>,
) -> ApiResult<web::Json<NextActionBody>> {
    let member_id = parse_member_id(query.into_inner().member_id)?;
    let response = state.queries.next_action(&member_id).await?;
    Ok(web::Json(response.into()))
}

/// Sign a member in to the active season.
#[utoipa::path(
    post,
    path = "/api/v1/kiosk/sign-in",
    request_body = MemberActionRequestBody,
    responses(
        (status = 200, description = "Entry opened", body = EntryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No account for member", body = Error),
        (status = 409, description = "Member already signed in", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "signIn"
)]
#[post("/kiosk/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    payload: web::Json<MemberActionRequestBody>,
) -> ApiResult<web::Json<EntryBody>> {
    let member_id = parse_member_id(payload.into_inner().member_id)?;
    let response = state.commands.sign_in(SignInRequest { member_id }).await?;
    Ok(web::Json(response.entry.into()))
}

/// Sign a member out: closes the open entry and tallies both running
/// totals atomically, returning the closed entry for immediate display.
#[utoipa::path(
    post,
    path = "/api/v1/kiosk/sign-out",
    request_body = MemberActionRequestBody,
    responses(
        (status = 200, description = "Entry closed with tallied total", body = EntryBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "No open entry for member", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "signOut"
)]
#[post("/kiosk/sign-out")]
pub async fn sign_out(
    state: web::Data<HttpState>,
    payload: web::Json<MemberActionRequestBody>,
) -> ApiResult<web::Json<EntryBody>> {
    let member_id = parse_member_id(payload.into_inner().member_id)?;
    let response = state.commands.sign_out(SignOutRequest { member_id }).await?;
    Ok(web::Json(response.entry.into()))
}

/// Response body for account creation: the account plus the opened entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponseBody {
    pub account: AccountBody,
    pub entry: EntryBody,
}

/// Create an account and sign the new member in immediately.
#[utoipa::path(
    post,
    path = "/api/v1/kiosk/accounts",
    request_body = CreateAccountRequestBody,
    responses(
        (status = 200, description = "Account created and member signed in", body = CreateAccountResponseBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Account already exists", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "createAccount"
)]
#[post("/kiosk/accounts")]
pub async fn create_account(
    state: web::Data<HttpState>,
    payload: web::Json<CreateAccountRequestBody>,
) -> ApiResult<web::Json<CreateAccountResponseBody>> {
    let payload = payload.into_inner();
    let member_id = parse_member_id(payload.member_id)?;
    let response = state
        .commands
        .create_account(CreateAccountRequest {
            member_id,
            name: payload.name,
        })
        .await?;
    Ok(web::Json(CreateAccountResponseBody {
        account: response.account.into(),
        entry: response.entry.into(),
    }))
}

/// Roster listing, optionally restricted to members with tallied time in
/// one season.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/accounts",
    params(RosterQuery),
    responses(
        (status = 200, description = "Accounts", body = [AccountBody]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "listAccounts"
)]
#[get("/kiosk/accounts")]
pub async fn list_accounts(
    state: web::Data<HttpState>,
    query: web::Query<RosterQuery>,
) -> ApiResult<web::Json<Vec<AccountBody>>> {
    let season_id = parse_optional_season_id(query.into_inner().season_id)?;
    let accounts = state.queries.list_accounts(season_id).await?;
    Ok(web::Json(accounts.into_iter().map(Into::into).collect()))
}

/// A member's accumulated hours per season.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/accounts/{member_id}/hours",
    params(("member_id" = String, Path, description = "Member id")),
    responses(
        (status = 200, description = "Accumulated hours", body = MemberHoursBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No account for member", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "memberHours"
)]
#[get("/kiosk/accounts/{member_id}/hours")]
pub async fn member_hours(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MemberHoursBody>> {
    let member_id = parse_member_id(path.into_inner())?;
    let response = state.queries.member_hours(&member_id).await?;
    Ok(web::Json(response.into()))
}

/// Ledger listing, newest sign-in first.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/entries",
    params(EntriesQuery),
    responses(
        (status = 200, description = "Ledger entries", body = [EntryBody]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "listEntries"
)]
#[get("/kiosk/entries")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    query: web::Query<EntriesQuery>,
) -> ApiResult<web::Json<Vec<EntryBody>>> {
    let query = query.into_inner();
    let season_id = parse_optional_season_id(query.season_id)?;
    let entries = state
        .queries
        .list_entries(season_id, query.active_only)
        .await?;
    Ok(web::Json(entries.into_iter().map(Into::into).collect()))
}

/// Every season with recorded time.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/seasons",
    responses(
        (status = 200, description = "Season totals", body = [SeasonTotalBody]),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "listSeasons"
)]
#[get("/kiosk/seasons")]
pub async fn list_seasons(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<SeasonTotalBody>>> {
    let seasons = state.queries.list_seasons().await?;
    Ok(web::Json(seasons.into_iter().map(Into::into).collect()))
}

/// One season's organisation-wide running total.
#[utoipa::path(
    get,
    path = "/api/v1/kiosk/seasons/{season_id}",
    params(("season_id" = String, Path, description = "Season id")),
    responses(
        (status = 200, description = "Season total", body = SeasonTotalBody),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Season has no recorded time", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["kiosk"],
    operation_id = "seasonTotal"
)]
#[get("/kiosk/seasons/{season_id}")]
pub async fn season_total(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SeasonTotalBody>> {
    let season_id = parse_season_id(path.into_inner())?;
    let response = state.queries.season_total(&season_id).await?;
    Ok(web::Json(response.into()))
}

#[cfg(test)]
#[path = "kiosk_tests.rs"]
mod tests;
