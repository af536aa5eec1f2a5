//! Attendance kiosk backend library.
//!
//! Members of an organisation enter their numeric id at a kiosk to sign in,
//! sign out, check accumulated hours, or create an account. Attendance is
//! persisted in PostgreSQL and aggregated per organisational season; the
//! sign-out transaction keeps the ledger entry, the member's season total,
//! and the organisation-wide season total consistent.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
