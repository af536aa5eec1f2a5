//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{account_season_totals, accounts, entries, season_totals};

/// Row struct for reading from the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: String,
    pub display_name: String,
}

/// Insertable struct for creating new account records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: &'a str,
    pub display_name: &'a str,
}

/// Row struct for reading one member-season running total.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_season_totals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountSeasonTotalRow {
    pub account_id: String,
    pub season_id: String,
    pub total_ms: i64,
}

/// Insertable struct seeding the upsert-with-delta on member-season totals.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_season_totals)]
pub(crate) struct NewAccountSeasonTotalRow<'a> {
    pub account_id: &'a str,
    pub season_id: &'a str,
    pub total_ms: i64,
}

/// Row struct for reading from the entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EntryRow {
    pub id: Uuid,
    pub account_id: String,
    pub season_id: String,
    pub time_in_ms: i64,
    pub time_out_ms: i64,
    pub total_ms: Option<i64>,
}

/// Insertable struct appending a freshly opened ledger entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entries)]
pub(crate) struct NewEntryRow<'a> {
    pub id: Uuid,
    pub account_id: &'a str,
    pub season_id: &'a str,
    pub time_in_ms: i64,
    pub time_out_ms: i64,
}

/// Row struct for reading one season's organisation-wide total.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = season_totals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SeasonTotalRow {
    pub id: String,
    pub total_ms: i64,
}

/// Insertable struct seeding the upsert-with-delta on season totals.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = season_totals)]
pub(crate) struct NewSeasonTotalRow<'a> {
    pub id: &'a str,
    pub total_ms: i64,
}
