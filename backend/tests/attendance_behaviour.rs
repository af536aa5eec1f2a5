//! Behavioural tests driving the attendance services end-to-end against an
//! in-memory store that honours the ledger port's atomicity contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use backend::domain::attendance::{
    Account, DisplayName, Entry, MemberId, SeasonId, SeasonTotal, TIME_OUT_FORFEITED, TIME_OUT_OPEN,
};
use backend::domain::ports::{
    AccountRepository, AccountRepositoryError, AttendanceCommand, AttendanceQuery,
    CreateAccountRequest, EntryRepository, EntryRepositoryError, NextAction, SeasonRepository,
    SeasonRepositoryError, SharedSeasonProvider, SignOutRequest, SignOutTally,
};
use backend::domain::{
    AttendanceCommandService, AttendanceQueryService, ErrorCode, ForfeitSweep,
};

const ONE_HOUR_MS: i64 = 3_600_000;

#[derive(Debug, Clone)]
struct EntryRecord {
    member_id: String,
    season_id: String,
    time_in_ms: i64,
    time_out_ms: i64,
    total_ms: Option<i64>,
}

#[derive(Debug, Default)]
struct StoreState {
    accounts: HashMap<String, String>,
    account_totals: HashMap<(String, String), i64>,
    entries: HashMap<Uuid, EntryRecord>,
    season_totals: HashMap<String, i64>,
    season_creates: usize,
}

/// Store double backing all three repository ports.
///
/// A single mutex guards the whole state, so `commit_sign_out` applies its
/// three writes as one atomic unit the same way the SQL transaction does,
/// including the open-sentinel compare-and-swap.
#[derive(Debug, Clone, Default)]
struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    fn season_create_count(&self) -> usize {
        self.lock().season_creates
    }

    fn record_to_entry(id: Uuid, record: &EntryRecord) -> Entry {
        Entry::from_parts(
            id,
            MemberId::new(&record.member_id).expect("stored member id is valid"),
            SeasonId::new(&record.season_id).expect("stored season id is valid"),
            record.time_in_ms,
            record.time_out_ms,
            record.total_ms,
        )
        .expect("stored entry is consistent")
    }
}

#[async_trait]
impl EntryRepository for InMemoryStore {
    async fn insert(&self, entry: &Entry) -> Result<(), EntryRepositoryError> {
        self.lock().entries.insert(
            entry.id(),
            EntryRecord {
                member_id: entry.member_id().to_string(),
                season_id: entry.season_id().to_string(),
                time_in_ms: entry.time_in_ms(),
                time_out_ms: entry.time_out_ms(),
                total_ms: entry.total_ms(),
            },
        );
        Ok(())
    }

    async fn find_open(
        &self,
        member_id: &MemberId,
        season_id: &SeasonId,
    ) -> Result<Option<Entry>, EntryRepositoryError> {
        let state = self.lock();
        Ok(state
            .entries
            .iter()
            .find(|(_, record)| {
                record.member_id == member_id.as_ref()
                    && record.season_id == season_id.as_ref()
                    && record.time_out_ms == TIME_OUT_OPEN
            })
            .map(|(id, record)| Self::record_to_entry(*id, record)))
    }

    async fn find_all(
        &self,
        season_id: Option<SeasonId>,
        active_only: bool,
    ) -> Result<Vec<Entry>, EntryRepositoryError> {
        let state = self.lock();
        let mut entries: Vec<Entry> = state
            .entries
            .iter()
            .filter(|(_, record)| {
                season_id
                    .as_ref()
                    .is_none_or(|season| record.season_id == season.as_ref())
                    && (!active_only || record.time_out_ms == TIME_OUT_OPEN)
            })
            .map(|(id, record)| Self::record_to_entry(*id, record))
            .collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.time_in_ms()));
        Ok(entries)
    }

    async fn commit_sign_out(&self, tally: &SignOutTally) -> Result<(), EntryRepositoryError> {
        let mut state = self.lock();

        // Compare-and-swap on the open sentinel; nothing is written unless
        // the guard matches.
        match state.entries.get(&tally.entry_id) {
            Some(record) if record.time_out_ms == TIME_OUT_OPEN => {}
            _ => {
                return Err(EntryRepositoryError::conflict(
                    "entry is no longer open; sign-out not applied",
                ));
            }
        }

        if let Some(record) = state.entries.get_mut(&tally.entry_id) {
            record.time_out_ms = tally.time_out_ms;
            record.total_ms = Some(tally.total_ms);
        }

        let member_key = (
            tally.member_id.as_ref().to_owned(),
            tally.season_id.as_ref().to_owned(),
        );
        *state.account_totals.entry(member_key).or_insert(0) += tally.total_ms;

        let season_key = tally.season_id.as_ref().to_owned();
        if let Some(total) = state.season_totals.get_mut(&season_key) {
            *total += tally.total_ms;
        } else {
            state.season_totals.insert(season_key, tally.total_ms);
            state.season_creates += 1;
        }

        Ok(())
    }

    async fn forfeit(&self, entry_id: Uuid) -> Result<(), EntryRepositoryError> {
        let mut state = self.lock();
        match state.entries.get_mut(&entry_id) {
            Some(record) if record.time_out_ms == TIME_OUT_OPEN => {
                record.time_out_ms = TIME_OUT_FORFEITED;
                record.total_ms = Some(0);
                Ok(())
            }
            _ => Err(EntryRepositoryError::conflict(
                "entry is no longer open; forfeit not applied",
            )),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let state = self.lock();
        let Some(name) = state.accounts.get(member_id.as_ref()) else {
            return Ok(None);
        };

        let seasons = state
            .account_totals
            .iter()
            .filter(|((member, _), _)| member == member_id.as_ref())
            .map(|((_, season), total)| {
                (
                    SeasonId::new(season).expect("stored season id is valid"),
                    *total,
                )
            })
            .collect();

        Ok(Some(Account::from_parts(
            member_id.clone(),
            DisplayName::new(name.clone()).expect("stored name is valid"),
            seasons,
        )))
    }

    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut state = self.lock();
        if state.accounts.contains_key(account.id().as_ref()) {
            return Err(AccountRepositoryError::already_exists(account.id().as_ref()));
        }
        state
            .accounts
            .insert(account.id().to_string(), account.name().to_string());
        Ok(())
    }

    async fn list(
        &self,
        with_hours_in: Option<SeasonId>,
    ) -> Result<Vec<Account>, AccountRepositoryError> {
        let member_ids: Vec<MemberId> = {
            let state = self.lock();
            state
                .accounts
                .keys()
                .filter(|member| {
                    with_hours_in.as_ref().is_none_or(|season| {
                        state
                            .account_totals
                            .get(&((*member).clone(), season.as_ref().to_owned()))
                            .is_some_and(|total| *total > 0)
                    })
                })
                .map(|member| MemberId::new(member).expect("stored member id is valid"))
                .collect()
        };

        let mut accounts = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            if let Some(account) = AccountRepository::find_by_id(self, &member_id).await? {
                accounts.push(account);
            }
        }
        Ok(accounts)
    }
}

#[async_trait]
impl SeasonRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        season_id: &SeasonId,
    ) -> Result<Option<SeasonTotal>, SeasonRepositoryError> {
        let state = self.lock();
        Ok(state
            .season_totals
            .get(season_id.as_ref())
            .map(|total| SeasonTotal::new(season_id.clone(), *total)))
    }

    async fn list(&self) -> Result<Vec<SeasonTotal>, SeasonRepositoryError> {
        let state = self.lock();
        state
            .season_totals
            .iter()
            .map(|(season, total)| {
                Ok(SeasonTotal::new(
                    SeasonId::new(season)
                        .map_err(|err| SeasonRepositoryError::query(err.to_string()))?,
                    *total,
                ))
            })
            .collect()
    }
}

/// Settable clock so tests control the elapsed duration exactly.
struct TestClock {
    epoch_ms: AtomicI64,
}

impl TestClock {
    fn starting_at(epoch_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            epoch_ms: AtomicI64::new(epoch_ms),
        })
    }

    fn advance_to(&self, epoch_ms: i64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.epoch_ms.load(Ordering::SeqCst))
            .single()
            .expect("valid test timestamp")
    }
}

type Commands =
    AttendanceCommandService<InMemoryStore, InMemoryStore, SharedSeasonProvider>;
type Queries =
    AttendanceQueryService<InMemoryStore, InMemoryStore, InMemoryStore, SharedSeasonProvider>;

struct Harness {
    store: InMemoryStore,
    clock: Arc<TestClock>,
    provider: Arc<SharedSeasonProvider>,
    commands: Commands,
    queries: Queries,
}

fn harness(start_ms: i64) -> Harness {
    let store = InMemoryStore::default();
    let clock = TestClock::starting_at(start_ms);
    let provider = Arc::new(SharedSeasonProvider::new(season("2024")));

    let shared = Arc::new(store.clone());
    let commands = AttendanceCommandService::new(
        Arc::clone(&shared),
        Arc::clone(&shared),
        Arc::clone(&provider),
        clock.clone() as Arc<dyn Clock>,
    );
    let queries = AttendanceQueryService::new(
        Arc::clone(&shared),
        Arc::clone(&shared),
        shared,
        Arc::clone(&provider),
    );

    Harness {
        store,
        clock,
        provider,
        commands,
        queries,
    }
}

fn member(raw: &str) -> MemberId {
    MemberId::new(raw).expect("valid member id")
}

fn season(raw: &str) -> SeasonId {
    SeasonId::new(raw).expect("valid season id")
}

async fn enroll(harness: &Harness, member_id: &str, name: &str) {
    harness
        .commands
        .create_account(CreateAccountRequest {
            member_id: member(member_id),
            name: name.to_owned(),
        })
        .await
        .expect("account creation succeeds");
}

#[tokio::test]
async fn one_hour_visit_tallies_entry_account_and_season() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;

    harness.clock.advance_to(ONE_HOUR_MS);
    let response = harness
        .commands
        .sign_out(SignOutRequest {
            member_id: member("1001"),
        })
        .await
        .expect("sign-out succeeds");

    assert_eq!(response.entry.time_in_ms, 0);
    assert_eq!(response.entry.time_out_ms, ONE_HOUR_MS);
    assert_eq!(response.entry.total_ms, Some(ONE_HOUR_MS));

    let hours = harness
        .queries
        .member_hours(&member("1001"))
        .await
        .expect("hours query succeeds");
    assert_eq!(hours.active_season_ms, ONE_HOUR_MS);

    let total = harness
        .queries
        .season_total(&season("2024"))
        .await
        .expect("season query succeeds");
    assert_eq!(total.total_ms, ONE_HOUR_MS);
}

#[tokio::test]
async fn dispatch_follows_the_decision_table_through_a_visit() {
    let harness = harness(1_000);

    let fresh = harness
        .queries
        .next_action(&member("1001"))
        .await
        .expect("dispatch succeeds");
    assert_eq!(fresh.action, NextAction::CreateAccount);

    enroll(&harness, "1001", "Ada Lovelace").await;
    let signed_in = harness
        .queries
        .next_action(&member("1001"))
        .await
        .expect("dispatch succeeds");
    assert_eq!(signed_in.action, NextAction::SignOut);

    harness.clock.advance_to(2_000);
    harness
        .commands
        .sign_out(SignOutRequest {
            member_id: member("1001"),
        })
        .await
        .expect("sign-out succeeds");

    let signed_out = harness
        .queries
        .next_action(&member("1001"))
        .await
        .expect("dispatch succeeds");
    assert_eq!(signed_out.action, NextAction::SignIn);
}

#[tokio::test]
async fn replayed_sign_out_does_not_double_count() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;

    harness.clock.advance_to(ONE_HOUR_MS);
    harness
        .commands
        .sign_out(SignOutRequest {
            member_id: member("1001"),
        })
        .await
        .expect("first sign-out succeeds");

    let error = harness
        .commands
        .sign_out(SignOutRequest {
            member_id: member("1001"),
        })
        .await
        .expect_err("replay must fail");
    assert_eq!(error.code(), ErrorCode::NoOpenEntry);

    let hours = harness
        .queries
        .member_hours(&member("1001"))
        .await
        .expect("hours query succeeds");
    assert_eq!(hours.active_season_ms, ONE_HOUR_MS);
}

#[tokio::test]
async fn forfeit_closes_the_entry_and_writes_no_aggregates() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;

    harness.clock.advance_to(ONE_HOUR_MS);
    let payload = harness
        .commands
        .forfeit_open_entry(&member("1001"), &season("2024"))
        .await
        .expect("forfeit succeeds");

    assert_eq!(payload.time_out_ms, TIME_OUT_FORFEITED);
    assert_eq!(payload.total_ms, Some(0));

    let hours = harness
        .queries
        .member_hours(&member("1001"))
        .await
        .expect("hours query succeeds");
    assert_eq!(hours.active_season_ms, 0);

    let error = harness
        .queries
        .season_total(&season("2024"))
        .await
        .expect_err("season must not have been created");
    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(harness.store.season_create_count(), 0);
}

#[tokio::test]
async fn concurrent_first_sign_outs_create_the_season_exactly_once() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;
    enroll(&harness, "1002", "Grace Hopper").await;

    harness.clock.advance_to(ONE_HOUR_MS);
    let (first, second) = tokio::join!(
        harness.commands.sign_out(SignOutRequest {
            member_id: member("1001"),
        }),
        harness.commands.sign_out(SignOutRequest {
            member_id: member("1002"),
        }),
    );
    let first = first.expect("first sign-out succeeds");
    let second = second.expect("second sign-out succeeds");

    let expected_total = first.entry.total_ms.expect("first entry tallied")
        + second.entry.total_ms.expect("second entry tallied");

    assert_eq!(harness.store.season_create_count(), 1);
    let total = harness
        .queries
        .season_total(&season("2024"))
        .await
        .expect("season query succeeds");
    assert_eq!(total.total_ms, expected_total);

    let seasons = harness
        .queries
        .list_seasons()
        .await
        .expect("season listing succeeds");
    assert_eq!(seasons.len(), 1);
}

#[tokio::test]
async fn racing_sign_outs_for_one_member_apply_the_tally_once() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;

    harness.clock.advance_to(ONE_HOUR_MS);
    let (first, second) = tokio::join!(
        harness.commands.sign_out(SignOutRequest {
            member_id: member("1001"),
        }),
        harness.commands.sign_out(SignOutRequest {
            member_id: member("1001"),
        }),
    );

    let outcomes = [first, second];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1, "exactly one sign-out may win");
    let loser = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("one sign-out must lose");
    assert!(
        matches!(loser.code(), ErrorCode::NoOpenEntry | ErrorCode::Conflict),
        "loser must surface the race, got {:?}",
        loser.code()
    );

    let hours = harness
        .queries
        .member_hours(&member("1001"))
        .await
        .expect("hours query succeeds");
    assert_eq!(hours.active_season_ms, ONE_HOUR_MS);
}

#[tokio::test]
async fn sweep_forfeits_open_entries_across_seasons() {
    let harness = harness(0);
    enroll(&harness, "1001", "Ada Lovelace").await;

    // A second member left signed in from a previous season.
    harness
        .provider
        .set(season("2023"))
        .expect("season swap succeeds");
    enroll(&harness, "1002", "Grace Hopper").await;
    harness
        .provider
        .set(season("2024"))
        .expect("season swap succeeds");

    harness.clock.advance_to(ONE_HOUR_MS);
    let sweep = ForfeitSweep::new(
        Arc::new(harness.commands.clone()),
        Arc::new(harness.queries.clone()),
    );
    let outcome = sweep.run().await.expect("sweep succeeds");

    assert_eq!(outcome.forfeited, 2);
    assert_eq!(outcome.failed, 0);

    let still_open = harness
        .queries
        .list_entries(None, true)
        .await
        .expect("listing succeeds");
    assert!(still_open.is_empty());

    // Forfeited time counts toward nothing.
    assert_eq!(harness.store.season_create_count(), 0);
}
