//! Member accounts and their per-season running totals.

use std::collections::BTreeMap;

use super::member::{DisplayName, MemberId};
use super::season::SeasonId;

/// A member account with accumulated attendance per season.
///
/// Accounts are created once, on a member's first visit, and are mutated
/// only by the sign-out transaction (incrementing one season's total).
/// Totals are never decremented and accounts are never deleted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: MemberId,
    name: DisplayName,
    seasons: BTreeMap<SeasonId, i64>,
}

impl Account {
    /// Create a brand-new account with no recorded attendance.
    pub fn new(id: MemberId, name: DisplayName) -> Self {
        Self {
            id,
            name,
            seasons: BTreeMap::new(),
        }
    }

    /// Reassemble an account from stored parts.
    pub fn from_parts(id: MemberId, name: DisplayName, seasons: BTreeMap<SeasonId, i64>) -> Self {
        Self { id, name, seasons }
    }

    /// Returns the member id.
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Returns the season → accumulated-milliseconds mapping.
    pub fn seasons(&self) -> &BTreeMap<SeasonId, i64> {
        &self.seasons
    }

    /// Accumulated milliseconds for one season, zero when the member has no
    /// tallied time there yet.
    pub fn season_total_ms(&self, season: &SeasonId) -> i64 {
        self.seasons.get(season).copied().unwrap_or(0)
    }
}
