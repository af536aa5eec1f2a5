//! Domain ports and supporting types for the hexagonal boundary.

mod account_repository;
mod attendance_command;
mod attendance_query;
mod entry_repository;
mod season_provider;
mod season_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use attendance_command::MockAttendanceCommand;
pub use attendance_command::{
    AccountPayload, AttendanceCommand, CreateAccountRequest, CreateAccountResponse, EntryPayload,
    SignInRequest, SignInResponse, SignOutRequest, SignOutResponse,
};
#[cfg(test)]
pub use attendance_query::MockAttendanceQuery;
pub use attendance_query::{
    AttendanceQuery, MemberHoursResponse, NextAction, NextActionResponse, SeasonTotalPayload,
};
#[cfg(test)]
pub use entry_repository::MockEntryRepository;
pub use entry_repository::{EntryRepository, EntryRepositoryError, SignOutTally};
#[cfg(test)]
pub use season_provider::MockSeasonProvider;
pub use season_provider::{SeasonProvider, SeasonProviderError, SharedSeasonProvider};
#[cfg(test)]
pub use season_repository::MockSeasonRepository;
pub use season_repository::{SeasonRepository, SeasonRepositoryError};
