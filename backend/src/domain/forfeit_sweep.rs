//! Scheduled forfeit sweep.
//!
//! An external scheduler (cron) runs this once daily to force-close every
//! still-open entry across all members and seasons. Forfeited time does not
//! count toward any total, and one member's failure never aborts the rest
//! of the batch.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::Error;
use crate::domain::ports::{AttendanceCommand, AttendanceQuery};

/// Counts reported by one sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Entries successfully forfeited.
    pub forfeited: usize,
    /// Entries whose forfeit failed; details are logged per member.
    pub failed: usize,
}

/// Batch runner closing open entries via the forfeit path.
pub struct ForfeitSweep<C, Q> {
    command: Arc<C>,
    query: Arc<Q>,
}

impl<C, Q> ForfeitSweep<C, Q> {
    /// Create a sweep over the kiosk command and query ports.
    pub fn new(command: Arc<C>, query: Arc<Q>) -> Self {
        Self { command, query }
    }
}

impl<C, Q> ForfeitSweep<C, Q>
where
    C: AttendanceCommand,
    Q: AttendanceQuery,
{
    /// Forfeit every open entry, isolating per-member failures.
    ///
    /// Fails outright only when the initial listing cannot be read; from
    /// then on each member's forfeit is attempted independently.
    pub async fn run(&self) -> Result<SweepOutcome, Error> {
        let open_entries = self.query.list_entries(None, true).await?;
        info!(open = open_entries.len(), "forfeit sweep starting");

        let mut outcome = SweepOutcome::default();
        for entry in open_entries {
            info!(
                member = %entry.member_id,
                season = %entry.season_id,
                "forfeiting open entry"
            );
            match self
                .command
                .forfeit_open_entry(&entry.member_id, &entry.season_id)
                .await
            {
                Ok(_) => outcome.forfeited += 1,
                Err(err) => {
                    error!(
                        member = %entry.member_id,
                        season = %entry.season_id,
                        error = %err,
                        "forfeit failed; continuing with remaining members"
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            forfeited = outcome.forfeited,
            failed = outcome.failed,
            "forfeit sweep finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "forfeit_sweep_tests.rs"]
mod tests;
