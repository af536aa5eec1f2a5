//! Ledger entries recording one sign-in / sign-out cycle.

use std::fmt;

use uuid::Uuid;

use super::member::MemberId;
use super::season::SeasonId;

/// Sentinel `time_out` value marking an entry as currently open.
pub const TIME_OUT_OPEN: i64 = 0;

/// Sentinel `time_out` value marking an entry closed without tallying.
pub const TIME_OUT_FORFEITED: i64 = -1;

/// Validation errors returned by the [`Entry`] constructors and transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    TimeInNegative,
    TimeOutBeforeSentinels { time_out_ms: i64 },
    OpenEntryWithTotal,
    ClosedEntryWithoutTotal,
    ForfeitedEntryWithTotal,
    NotOpen,
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeInNegative => write!(f, "timeIn must not be negative"),
            Self::TimeOutBeforeSentinels { time_out_ms } => {
                write!(f, "timeOut {time_out_ms} is below the forfeit sentinel")
            }
            Self::OpenEntryWithTotal => write!(f, "an open entry must not carry a total"),
            Self::ClosedEntryWithoutTotal => write!(f, "a closed entry must carry a total"),
            Self::ForfeitedEntryWithTotal => {
                write!(f, "a forfeited entry must carry a zero total")
            }
            Self::NotOpen => write!(f, "entry is not open"),
        }
    }
}

impl std::error::Error for EntryValidationError {}

/// Lifecycle state derived from the `time_out` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Member is signed in; `time_out == 0`.
    Open,
    /// Member signed out normally; `time_out` holds the epoch timestamp.
    Closed,
    /// Entry was closed without tallying; `time_out == -1`.
    Forfeited,
}

/// One attendance ledger entry.
///
/// A member may accumulate many entries per season, but at most one entry
/// per (member, season) pair is open at any instant. Entries transition
/// exactly once, from open to closed or forfeited, and are never mutated
/// again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: Uuid,
    member_id: MemberId,
    season_id: SeasonId,
    time_in_ms: i64,
    time_out_ms: i64,
    total_ms: Option<i64>,
}

impl Entry {
    /// Create a fresh open entry at the given sign-in time.
    pub fn open(
        id: Uuid,
        member_id: MemberId,
        season_id: SeasonId,
        time_in_ms: i64,
    ) -> Result<Self, EntryValidationError> {
        Self::from_parts(id, member_id, season_id, time_in_ms, TIME_OUT_OPEN, None)
    }

    /// Reassemble an entry from stored parts, validating sentinel consistency.
    pub fn from_parts(
        id: Uuid,
        member_id: MemberId,
        season_id: SeasonId,
        time_in_ms: i64,
        time_out_ms: i64,
        total_ms: Option<i64>,
    ) -> Result<Self, EntryValidationError> {
        if time_in_ms < 0 {
            return Err(EntryValidationError::TimeInNegative);
        }
        if time_out_ms < TIME_OUT_FORFEITED {
            return Err(EntryValidationError::TimeOutBeforeSentinels { time_out_ms });
        }
        match time_out_ms {
            TIME_OUT_OPEN if total_ms.is_some() => {
                return Err(EntryValidationError::OpenEntryWithTotal);
            }
            TIME_OUT_FORFEITED if total_ms != Some(0) => {
                return Err(EntryValidationError::ForfeitedEntryWithTotal);
            }
            out if out > 0 && total_ms.is_none() => {
                return Err(EntryValidationError::ClosedEntryWithoutTotal);
            }
            _ => {}
        }
        Ok(Self {
            id,
            member_id,
            season_id,
            time_in_ms,
            time_out_ms,
            total_ms,
        })
    }

    /// Returns the entry id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning member id.
    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    /// Returns the season the entry was recorded in.
    pub fn season_id(&self) -> &SeasonId {
        &self.season_id
    }

    /// Returns the sign-in time in epoch milliseconds.
    pub fn time_in_ms(&self) -> i64 {
        self.time_in_ms
    }

    /// Returns the raw sign-out field, including sentinels.
    pub fn time_out_ms(&self) -> i64 {
        self.time_out_ms
    }

    /// Returns the tallied duration, present only once closed.
    pub fn total_ms(&self) -> Option<i64> {
        self.total_ms
    }

    /// Lifecycle state derived from the sign-out sentinel.
    pub fn status(&self) -> EntryStatus {
        match self.time_out_ms {
            TIME_OUT_OPEN => EntryStatus::Open,
            TIME_OUT_FORFEITED => EntryStatus::Forfeited,
            _ => EntryStatus::Closed,
        }
    }

    /// Whether the member is still signed in on this entry.
    pub fn is_open(&self) -> bool {
        self.status() == EntryStatus::Open
    }

    /// Transition the entry to closed with the tallied duration.
    ///
    /// The caller supplies both values from a single clock read so the
    /// recorded `time_out` and the duration agree exactly.
    pub fn closed(self, time_out_ms: i64, total_ms: i64) -> Result<Self, EntryValidationError> {
        if !self.is_open() {
            return Err(EntryValidationError::NotOpen);
        }
        Self::from_parts(
            self.id,
            self.member_id,
            self.season_id,
            self.time_in_ms,
            time_out_ms,
            Some(total_ms),
        )
    }

    /// Transition the entry to forfeited: closed without tallying.
    pub fn forfeited(self) -> Result<Self, EntryValidationError> {
        if !self.is_open() {
            return Err(EntryValidationError::NotOpen);
        }
        Self::from_parts(
            self.id,
            self.member_id,
            self.season_id,
            self.time_in_ms,
            TIME_OUT_FORFEITED,
            Some(0),
        )
    }
}
