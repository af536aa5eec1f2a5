//! PostgreSQL-backed season aggregate reads using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::attendance::{SeasonId, SeasonTotal};
use crate::domain::ports::{SeasonRepository, SeasonRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::SeasonTotalRow;
use super::pool::{DbPool, PoolError};
use super::schema::season_totals;

/// Diesel-backed implementation of the season repository port.
#[derive(Clone)]
pub struct DieselSeasonRepository {
    pool: DbPool,
}

impl DieselSeasonRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to season repository errors.
fn map_pool(error: PoolError) -> SeasonRepositoryError {
    map_pool_error(error, SeasonRepositoryError::connection)
}

/// Map Diesel errors to season repository errors.
fn map_diesel(error: diesel::result::Error) -> SeasonRepositoryError {
    map_diesel_error(
        error,
        SeasonRepositoryError::query,
        SeasonRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain aggregate.
fn row_to_season(row: SeasonTotalRow) -> Result<SeasonTotal, SeasonRepositoryError> {
    let season_id =
        SeasonId::new(row.id).map_err(|err| SeasonRepositoryError::query(err.to_string()))?;
    Ok(SeasonTotal::new(season_id, row.total_ms))
}

#[async_trait]
impl SeasonRepository for DieselSeasonRepository {
    async fn find_by_id(
        &self,
        season_id: &SeasonId,
    ) -> Result<Option<SeasonTotal>, SeasonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = season_totals::table
            .filter(season_totals::id.eq(season_id.as_ref()))
            .select(SeasonTotalRow::as_select())
            .first::<SeasonTotalRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_season).transpose()
    }

    async fn list(&self) -> Result<Vec<SeasonTotal>, SeasonRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<SeasonTotalRow> = season_totals::table
            .order(season_totals::id.asc())
            .select(SeasonTotalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_season).collect()
    }
}
