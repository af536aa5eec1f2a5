//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed attendance entities, the port seams the
//! adapters implement, and the services behind the kiosk driving ports.
//! Types are immutable; invariants and serialisation contracts live in each
//! type's Rustdoc.

pub mod attendance;
pub mod error;
pub mod ports;

mod attendance_service;
mod forfeit_sweep;

pub use self::attendance::{
    Account, DisplayName, Entry, EntryStatus, EntryValidationError, MemberId,
    MemberValidationError, SeasonId, SeasonTotal, SeasonValidationError, TIME_OUT_FORFEITED,
    TIME_OUT_OPEN,
};
pub use self::attendance_service::{AttendanceCommandService, AttendanceQueryService};
pub use self::error::{Error, ErrorCode};
pub use self::forfeit_sweep::{ForfeitSweep, SweepOutcome};

/// Convenient result alias for operations surfacing domain errors.
pub type ApiResult<T> = Result<T, Error>;
