//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AttendanceCommand, AttendanceQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Kiosk write operations: sign-in, sign-out, account creation.
    pub commands: Arc<dyn AttendanceCommand>,
    /// Kiosk read operations: dispatch, hours, roster, listings.
    pub queries: Arc<dyn AttendanceQuery>,
}

impl HttpState {
    /// Bundle the kiosk driving ports for handler injection.
    pub fn new(commands: Arc<dyn AttendanceCommand>, queries: Arc<dyn AttendanceQuery>) -> Self {
        Self { commands, queries }
    }
}
