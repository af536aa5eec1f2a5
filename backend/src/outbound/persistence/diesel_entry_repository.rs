//! PostgreSQL-backed attendance ledger using Diesel ORM.
//!
//! Besides the plain ledger reads and writes, this adapter owns the atomic
//! sign-out commit: one SQL transaction closes the entry (guarded by the
//! open sentinel) and applies the upsert-with-delta to the member's and the
//! season's running totals. Either all three writes land or none do.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::attendance::{Entry, MemberId, SeasonId, TIME_OUT_FORFEITED, TIME_OUT_OPEN};
use crate::domain::ports::{EntryRepository, EntryRepositoryError, SignOutTally};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{EntryRow, NewAccountSeasonTotalRow, NewEntryRow, NewSeasonTotalRow};
use super::pool::{DbPool, PoolError};
use super::schema::{account_season_totals, entries, season_totals};

/// Diesel-backed implementation of the ledger port.
#[derive(Clone)]
pub struct DieselEntryRepository {
    pool: DbPool,
}

impl DieselEntryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to ledger errors.
fn map_pool(error: PoolError) -> EntryRepositoryError {
    map_pool_error(error, EntryRepositoryError::connection)
}

/// Map Diesel errors to ledger errors.
fn map_diesel(error: diesel::result::Error) -> EntryRepositoryError {
    map_diesel_error(
        error,
        EntryRepositoryError::query,
        EntryRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain entry.
fn row_to_entry(row: EntryRow) -> Result<Entry, EntryRepositoryError> {
    let EntryRow {
        id,
        account_id,
        season_id,
        time_in_ms,
        time_out_ms,
        total_ms,
    } = row;

    let member_id =
        MemberId::new(account_id).map_err(|err| EntryRepositoryError::query(err.to_string()))?;
    let season_id =
        SeasonId::new(season_id).map_err(|err| EntryRepositoryError::query(err.to_string()))?;

    Entry::from_parts(id, member_id, season_id, time_in_ms, time_out_ms, total_ms)
        .map_err(|err| EntryRepositoryError::query(err.to_string()))
}

/// Failure inside the sign-out transaction.
///
/// `Raced` aborts the transaction when the open-sentinel guard matched no
/// row, so the aggregate increments are rolled back with the entry close.
enum SignOutTxError {
    Raced,
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for SignOutTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl EntryRepository for DieselEntryRepository {
    async fn insert(&self, entry: &Entry) -> Result<(), EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewEntryRow {
            id: entry.id(),
            account_id: entry.member_id().as_ref(),
            season_id: entry.season_id().as_ref(),
            time_in_ms: entry.time_in_ms(),
            time_out_ms: entry.time_out_ms(),
        };

        diesel::insert_into(entries::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_open(
        &self,
        member_id: &MemberId,
        season_id: &SeasonId,
    ) -> Result<Option<Entry>, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = entries::table
            .filter(
                entries::account_id
                    .eq(member_id.as_ref())
                    .and(entries::season_id.eq(season_id.as_ref()))
                    .and(entries::time_out_ms.eq(TIME_OUT_OPEN)),
            )
            .select(EntryRow::as_select())
            .first::<EntryRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_entry).transpose()
    }

    async fn find_all(
        &self,
        season_id: Option<SeasonId>,
        active_only: bool,
    ) -> Result<Vec<Entry>, EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = entries::table.into_boxed();
        if let Some(season_id) = season_id {
            query = query.filter(entries::season_id.eq(String::from(season_id)));
        }
        if active_only {
            query = query.filter(entries::time_out_ms.eq(TIME_OUT_OPEN));
        }

        let rows: Vec<EntryRow> = query
            .order((entries::time_in_ms.desc(), entries::id.desc()))
            .select(EntryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn commit_sign_out(&self, tally: &SignOutTally) -> Result<(), EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let conn = &mut *conn;

        let result = conn
            .transaction::<_, SignOutTxError, _>(|conn| {
                async move {
                    // Close the entry only while it is still open. Matching
                    // zero rows means a concurrent sign-out won; aborting
                    // here rolls the whole transaction back before either
                    // aggregate is touched.
                    let closed = diesel::update(
                        entries::table.filter(
                            entries::id
                                .eq(tally.entry_id)
                                .and(entries::time_out_ms.eq(TIME_OUT_OPEN)),
                        ),
                    )
                    .set((
                        entries::time_out_ms.eq(tally.time_out_ms),
                        entries::total_ms.eq(Some(tally.total_ms)),
                    ))
                    .execute(conn)
                    .await?;

                    if closed == 0 {
                        return Err(SignOutTxError::Raced);
                    }

                    diesel::insert_into(account_season_totals::table)
                        .values(NewAccountSeasonTotalRow {
                            account_id: tally.member_id.as_ref(),
                            season_id: tally.season_id.as_ref(),
                            total_ms: tally.total_ms,
                        })
                        .on_conflict((
                            account_season_totals::account_id,
                            account_season_totals::season_id,
                        ))
                        .do_update()
                        .set((
                            account_season_totals::total_ms.eq(account_season_totals::total_ms
                                + excluded(account_season_totals::total_ms)),
                            account_season_totals::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    // Create-or-increment collapses into one upsert, so two
                    // concurrent first sign-outs of a new season cannot both
                    // observe "missing" and lose an update.
                    diesel::insert_into(season_totals::table)
                        .values(NewSeasonTotalRow {
                            id: tally.season_id.as_ref(),
                            total_ms: tally.total_ms,
                        })
                        .on_conflict(season_totals::id)
                        .do_update()
                        .set((
                            season_totals::total_ms
                                .eq(season_totals::total_ms + excluded(season_totals::total_ms)),
                            season_totals::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(SignOutTxError::Raced) => Err(EntryRepositoryError::conflict(
                "entry is no longer open; sign-out not applied",
            )),
            Err(SignOutTxError::Diesel(error)) => Err(map_diesel(error)),
        }
    }

    async fn forfeit(&self, entry_id: Uuid) -> Result<(), EntryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let affected = diesel::update(
            entries::table.filter(
                entries::id
                    .eq(entry_id)
                    .and(entries::time_out_ms.eq(TIME_OUT_OPEN)),
            ),
        )
        .set((
            entries::time_out_ms.eq(TIME_OUT_FORFEITED),
            entries::total_ms.eq(Some(0_i64)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        if affected == 0 {
            return Err(EntryRepositoryError::conflict(
                "entry is no longer open; forfeit not applied",
            ));
        }
        Ok(())
    }
}
