//! PostgreSQL-backed account repository using Diesel ORM.
//!
//! The document store's `seasons` map field is normalised into
//! `account_season_totals` rows; this adapter reassembles the map when
//! loading accounts. Reads spanning both tables run inside one transaction
//! so they observe a consistent MVCC snapshot.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel_async::AsyncConnection as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::attendance::{Account, DisplayName, MemberId, SeasonId};
use crate::domain::ports::{AccountRepository, AccountRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AccountRow, AccountSeasonTotalRow, NewAccountRow};
use super::pool::{DbPool, PoolError};
use super::schema::{account_season_totals, accounts};

/// Diesel-backed implementation of the account repository port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to account repository errors.
fn map_pool(error: PoolError) -> AccountRepositoryError {
    map_pool_error(error, AccountRepositoryError::connection)
}

/// Map Diesel errors to account repository errors.
fn map_diesel(error: diesel::result::Error) -> AccountRepositoryError {
    map_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

fn season_map(
    rows: Vec<AccountSeasonTotalRow>,
) -> Result<BTreeMap<SeasonId, i64>, AccountRepositoryError> {
    rows.into_iter()
        .map(|row| {
            let season_id = SeasonId::new(row.season_id)
                .map_err(|err| AccountRepositoryError::query(err.to_string()))?;
            Ok((season_id, row.total_ms))
        })
        .collect()
}

/// Convert an account row plus its season totals into a domain account.
fn rows_to_account(
    row: AccountRow,
    totals: Vec<AccountSeasonTotalRow>,
) -> Result<Account, AccountRepositoryError> {
    let member_id =
        MemberId::new(row.id).map_err(|err| AccountRepositoryError::query(err.to_string()))?;
    let name = DisplayName::new(row.display_name)
        .map_err(|err| AccountRepositoryError::query(err.to_string()))?;
    Ok(Account::from_parts(member_id, name, season_map(totals)?))
}

async fn load_totals_for(
    conn: &mut AsyncPgConnection,
    account_ids: &[String],
) -> Result<Vec<AccountSeasonTotalRow>, diesel::result::Error> {
    let ids: Vec<&str> = account_ids.iter().map(String::as_str).collect();
    account_season_totals::table
        .filter(account_season_totals::account_id.eq_any(ids))
        .select(AccountSeasonTotalRow::as_select())
        .load(conn)
        .await
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_id(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let conn = &mut *conn;
        let id = member_id.as_ref().to_owned();

        let fetched = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let row = accounts::table
                        .filter(accounts::id.eq(&id))
                        .select(AccountRow::as_select())
                        .first::<AccountRow>(conn)
                        .await
                        .optional()?;

                    let Some(row) = row else {
                        return Ok(None);
                    };

                    let totals = load_totals_for(conn, std::slice::from_ref(&id)).await?;
                    Ok(Some((row, totals)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;

        fetched
            .map(|(row, totals)| rows_to_account(row, totals))
            .transpose()
    }

    async fn create(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewAccountRow {
            id: account.id().as_ref(),
            display_name: account.name().as_ref(),
        };

        diesel::insert_into(accounts::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| match error {
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    AccountRepositoryError::already_exists(account.id().as_ref())
                }
                other => map_diesel(other),
            })
    }

    async fn list(
        &self,
        with_hours_in: Option<SeasonId>,
    ) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let conn = &mut *conn;

        let (rows, totals) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let rows: Vec<AccountRow> = match with_hours_in {
                        Some(season_id) => {
                            // Roster export for one season: only members
                            // with tallied time there.
                            let member_ids: Vec<String> = account_season_totals::table
                                .filter(
                                    account_season_totals::season_id
                                        .eq(String::from(season_id))
                                        .and(account_season_totals::total_ms.gt(0)),
                                )
                                .select(account_season_totals::account_id)
                                .load(conn)
                                .await?;

                            accounts::table
                                .filter(accounts::id.eq_any(member_ids))
                                .order(accounts::id.asc())
                                .select(AccountRow::as_select())
                                .load(conn)
                                .await?
                        }
                        None => {
                            accounts::table
                                .order(accounts::id.asc())
                                .select(AccountRow::as_select())
                                .load(conn)
                                .await?
                        }
                    };

                    let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
                    let totals = load_totals_for(conn, &ids).await?;
                    Ok((rows, totals))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;

        let mut totals_by_member: HashMap<String, Vec<AccountSeasonTotalRow>> = HashMap::new();
        for total in totals {
            totals_by_member
                .entry(total.account_id.clone())
                .or_default()
                .push(total);
        }

        rows.into_iter()
            .map(|row| {
                let totals = totals_by_member.remove(&row.id).unwrap_or_default();
                rows_to_account(row, totals)
            })
            .collect()
    }
}
