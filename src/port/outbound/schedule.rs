//! Static tournament schedule port.

use crate::domain::id::TournamentId;
use crate::domain::standings::ScheduledMatch;

/// Supplies the fixture list of a tournament.
pub trait ScheduleSource: Send + Sync {
    /// Fixtures of a tournament, or `None` if it is not configured.
    fn schedule(&self, tournament: &TournamentId) -> Option<Vec<ScheduledMatch>>;

    /// Every configured tournament.
    fn tournaments(&self) -> Vec<TournamentId>;
}
