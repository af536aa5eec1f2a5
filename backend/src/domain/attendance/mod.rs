//! Attendance domain: members, seasons, and the sign-in/out ledger.

mod account;
mod entry;
mod member;
mod season;

pub use account::Account;
pub use entry::{
    Entry, EntryStatus, EntryValidationError, TIME_OUT_FORFEITED, TIME_OUT_OPEN,
};
pub use member::{DISPLAY_NAME_MAX, DisplayName, MEMBER_ID_MAX, MemberId, MemberValidationError};
pub use season::{SEASON_ID_MAX, SeasonId, SeasonTotal, SeasonValidationError};
