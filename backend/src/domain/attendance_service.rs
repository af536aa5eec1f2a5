//! Attendance domain services.
//!
//! These services implement the kiosk driving ports. The command service
//! owns the sign-out coordination: locate the open entry, read the clock
//! once, and hand the ledger one grouped tally so the entry close and both
//! aggregate increments land together or not at all.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::attendance::{Account, DisplayName, Entry, MemberId, SeasonId};
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AttendanceCommand, AttendanceQuery,
    CreateAccountRequest, CreateAccountResponse, EntryPayload, EntryRepository,
    EntryRepositoryError, MemberHoursResponse, NextAction, NextActionResponse, SeasonProvider,
    SeasonProviderError, SeasonRepository, SeasonRepositoryError, SeasonTotalPayload,
    SignInRequest, SignInResponse, SignOutRequest, SignOutResponse, SignOutTally,
};

fn map_ledger_error(error: EntryRepositoryError) -> Error {
    match error {
        EntryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger unavailable: {message}"))
        }
        EntryRepositoryError::Query { message } => {
            Error::internal(format!("ledger error: {message}"))
        }
        EntryRepositoryError::Conflict { message } => Error::conflict(message),
    }
}

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account store unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account store error: {message}"))
        }
        AccountRepositoryError::AlreadyExists { member_id } => {
            Error::conflict(format!("account {member_id} already exists"))
        }
    }
}

fn map_season_error(error: SeasonRepositoryError) -> Error {
    match error {
        SeasonRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("season store unavailable: {message}"))
        }
        SeasonRepositoryError::Query { message } => {
            Error::internal(format!("season store error: {message}"))
        }
    }
}

fn map_provider_error(error: SeasonProviderError) -> Error {
    let SeasonProviderError::Unavailable { message } = error;
    Error::service_unavailable(format!("active season unavailable: {message}"))
}

/// Attendance service implementing the command driving port.
pub struct AttendanceCommandService<L, A, P> {
    ledger: Arc<L>,
    accounts: Arc<A>,
    season_provider: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<L, A, P> Clone for AttendanceCommandService<L, A, P> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            accounts: Arc::clone(&self.accounts),
            season_provider: Arc::clone(&self.season_provider),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L, A, P> AttendanceCommandService<L, A, P> {
    /// Create a new command service with the ledger, account store, active
    /// season provider, and clock.
    pub fn new(
        ledger: Arc<L>,
        accounts: Arc<A>,
        season_provider: Arc<P>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            accounts,
            season_provider,
            clock,
        }
    }
}

impl<L, A, P> AttendanceCommandService<L, A, P>
where
    L: EntryRepository,
    A: AccountRepository,
    P: SeasonProvider,
{
    async fn active_season(&self) -> Result<SeasonId, Error> {
        self.season_provider
            .active_season()
            .await
            .map_err(map_provider_error)
    }

    fn now_ms(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }
}

#[async_trait]
impl<L, A, P> AttendanceCommand for AttendanceCommandService<L, A, P>
where
    L: EntryRepository,
    A: AccountRepository,
    P: SeasonProvider,
{
    async fn sign_in(&self, request: SignInRequest) -> Result<SignInResponse, Error> {
        let season_id = self.active_season().await?;

        // The kiosk's debounced lookup is advisory; the open-entry invariant
        // is re-checked here, against the store, before inserting.
        if let Some(existing) = self
            .ledger
            .find_open(&request.member_id, &season_id)
            .await
            .map_err(map_ledger_error)?
        {
            return Err(Error::conflict(format!(
                "member {} is already signed in",
                request.member_id
            ))
            .with_details(json!({ "entryId": existing.id() })));
        }

        self.accounts
            .find_by_id(&request.member_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no account for member {}", request.member_id))
            })?;

        let entry = Entry::open(
            Uuid::new_v4(),
            request.member_id,
            season_id,
            self.now_ms(),
        )
        .map_err(|err| Error::internal(format!("sign-in entry invalid: {err}")))?;

        self.ledger
            .insert(&entry)
            .await
            .map_err(map_ledger_error)?;

        Ok(SignInResponse {
            entry: entry.into(),
        })
    }

    async fn sign_out(&self, request: SignOutRequest) -> Result<SignOutResponse, Error> {
        let season_id = self.active_season().await?;

        let entry = self
            .ledger
            .find_open(&request.member_id, &season_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| {
                Error::no_open_entry(format!(
                    "no open entry for member {} in season {season_id}",
                    request.member_id
                ))
            })?;

        // One clock read serves both the recorded timeOut and the duration.
        let time_out_ms = self.now_ms();
        let total_ms = time_out_ms - entry.time_in_ms();

        let tally = SignOutTally {
            entry_id: entry.id(),
            member_id: entry.member_id().clone(),
            season_id: entry.season_id().clone(),
            time_out_ms,
            total_ms,
        };
        self.ledger
            .commit_sign_out(&tally)
            .await
            .map_err(map_ledger_error)?;

        // Assemble the closed entry locally; the caller displays it without
        // a store round-trip.
        let closed = entry
            .closed(time_out_ms, total_ms)
            .map_err(|err| Error::internal(format!("closed entry invalid: {err}")))?;

        Ok(SignOutResponse {
            entry: closed.into(),
        })
    }

    async fn create_account(
        &self,
        request: CreateAccountRequest,
    ) -> Result<CreateAccountResponse, Error> {
        let name = DisplayName::new(request.name)
            .map_err(|err| Error::invalid_request(format!("invalid display name: {err}")))?;

        let account = Account::new(request.member_id.clone(), name);
        self.accounts
            .create(&account)
            .await
            .map_err(map_account_error)?;

        let signed_in = self
            .sign_in(SignInRequest {
                member_id: request.member_id,
            })
            .await?;

        Ok(CreateAccountResponse {
            account: account.into(),
            entry: signed_in.entry,
        })
    }

    async fn forfeit_open_entry(
        &self,
        member_id: &MemberId,
        season_id: &SeasonId,
    ) -> Result<EntryPayload, Error> {
        let entry = self
            .ledger
            .find_open(member_id, season_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| {
                Error::no_open_entry(format!(
                    "no open entry for member {member_id} in season {season_id}"
                ))
            })?;

        self.ledger
            .forfeit(entry.id())
            .await
            .map_err(map_ledger_error)?;

        let forfeited = entry
            .forfeited()
            .map_err(|err| Error::internal(format!("forfeited entry invalid: {err}")))?;

        Ok(forfeited.into())
    }
}

/// Attendance service implementing the query driving port.
pub struct AttendanceQueryService<L, A, S, P> {
    ledger: Arc<L>,
    accounts: Arc<A>,
    seasons: Arc<S>,
    season_provider: Arc<P>,
}

impl<L, A, S, P> Clone for AttendanceQueryService<L, A, S, P> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            accounts: Arc::clone(&self.accounts),
            seasons: Arc::clone(&self.seasons),
            season_provider: Arc::clone(&self.season_provider),
        }
    }
}

impl<L, A, S, P> AttendanceQueryService<L, A, S, P> {
    /// Create a new query service over the ledger, account store, season
    /// store, and active season provider.
    pub fn new(
        ledger: Arc<L>,
        accounts: Arc<A>,
        seasons: Arc<S>,
        season_provider: Arc<P>,
    ) -> Self {
        Self {
            ledger,
            accounts,
            seasons,
            season_provider,
        }
    }
}

#[async_trait]
impl<L, A, S, P> AttendanceQuery for AttendanceQueryService<L, A, S, P>
where
    L: EntryRepository,
    A: AccountRepository,
    S: SeasonRepository,
    P: SeasonProvider,
{
    async fn next_action(&self, member_id: &MemberId) -> Result<NextActionResponse, Error> {
        let season_id = self
            .season_provider
            .active_season()
            .await
            .map_err(map_provider_error)?;

        // Both lookups are independent; issue them concurrently to keep the
        // kiosk responsive while the member is still typing.
        let (open_entry, account) = tokio::join!(
            self.ledger.find_open(member_id, &season_id),
            self.accounts.find_by_id(member_id),
        );
        let open_entry = open_entry.map_err(map_ledger_error)?;
        let account = account.map_err(map_account_error)?;

        let action = match (&open_entry, &account) {
            (Some(_), _) => NextAction::SignOut,
            (None, Some(_)) => NextAction::SignIn,
            (None, None) => NextAction::CreateAccount,
        };

        Ok(NextActionResponse {
            action,
            account: account.map(Into::into),
            open_entry: open_entry.map(Into::into),
        })
    }

    async fn member_hours(&self, member_id: &MemberId) -> Result<MemberHoursResponse, Error> {
        let season_id = self
            .season_provider
            .active_season()
            .await
            .map_err(map_provider_error)?;

        let account = self
            .accounts
            .find_by_id(member_id)
            .await
            .map_err(map_account_error)?
            .ok_or_else(|| Error::not_found(format!("no account for member {member_id}")))?;

        Ok(MemberHoursResponse {
            member_id: account.id().clone(),
            active_season_ms: account.season_total_ms(&season_id),
            seasons: account.seasons().clone(),
            active_season: season_id,
        })
    }

    async fn list_accounts(
        &self,
        with_hours_in: Option<SeasonId>,
    ) -> Result<Vec<crate::domain::ports::AccountPayload>, Error> {
        let accounts = self
            .accounts
            .list(with_hours_in)
            .await
            .map_err(map_account_error)?;
        Ok(accounts.into_iter().map(Into::into).collect())
    }

    async fn list_entries(
        &self,
        season_id: Option<SeasonId>,
        active_only: bool,
    ) -> Result<Vec<EntryPayload>, Error> {
        let entries = self
            .ledger
            .find_all(season_id, active_only)
            .await
            .map_err(map_ledger_error)?;
        Ok(entries.into_iter().map(Into::into).collect())
    }

    async fn season_total(&self, season_id: &SeasonId) -> Result<SeasonTotalPayload, Error> {
        self.seasons
            .find_by_id(season_id)
            .await
            .map_err(map_season_error)?
            .map(Into::into)
            .ok_or_else(|| Error::not_found(format!("season {season_id} has no recorded time")))
    }

    async fn list_seasons(&self) -> Result<Vec<SeasonTotalPayload>, Error> {
        let seasons = self.seasons.list().await.map_err(map_season_error)?;
        Ok(seasons.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[path = "attendance_service_tests.rs"]
mod tests;
