//! PostgreSQL persistence adapters implementing the domain ports.

mod diesel_account_repository;
mod diesel_entry_repository;
mod diesel_season_repository;
mod error_mapping;
mod models;
mod pool;
pub mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_entry_repository::DieselEntryRepository;
pub use diesel_season_repository::DieselSeasonRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
