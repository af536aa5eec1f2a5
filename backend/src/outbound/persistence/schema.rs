//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Member accounts keyed by the kiosk-entered digit string.
    accounts (id) {
        /// Primary key: externally assigned numeric member id.
        id -> Varchar,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-member, per-season accumulated milliseconds.
    ///
    /// One row per (member, season); rows are created and incremented only
    /// by the sign-out transaction's upsert-with-delta.
    account_season_totals (account_id, season_id) {
        /// Member owning this total.
        account_id -> Varchar,
        /// Season the total belongs to.
        season_id -> Varchar,
        /// Accumulated milliseconds.
        total_ms -> Int8,
        /// Last increment timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attendance ledger.
    ///
    /// `time_out_ms` carries the open/forfeit sentinels: 0 means open,
    /// -1 means forfeited, any positive value is a normal close.
    entries (id) {
        /// Primary key: generated entry id.
        id -> Uuid,
        /// Member who signed in.
        account_id -> Varchar,
        /// Season the entry was recorded in.
        season_id -> Varchar,
        /// Sign-in time, epoch milliseconds.
        time_in_ms -> Int8,
        /// Sign-out time or sentinel.
        time_out_ms -> Int8,
        /// Tallied duration, set once on close.
        total_ms -> Nullable<Int8>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Organisation-wide running totals per season.
    season_totals (id) {
        /// Primary key: season id.
        id -> Varchar,
        /// Accumulated milliseconds across all members.
        total_ms -> Int8,
        /// Last increment timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(account_season_totals -> accounts (account_id));
diesel::joinable!(entries -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    account_season_totals,
    entries,
    season_totals,
);
