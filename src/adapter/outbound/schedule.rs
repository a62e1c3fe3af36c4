//! Schedule source over fixtures loaded at startup.

use std::collections::BTreeMap;

use crate::domain::id::TournamentId;
use crate::domain::standings::ScheduledMatch;
use crate::port::outbound::schedule::ScheduleSource;

#[derive(Debug, Clone, Default)]
pub struct StaticSchedule {
    tournaments: BTreeMap<TournamentId, Vec<ScheduledMatch>>,
}

impl StaticSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tournament(mut self, id: TournamentId, fixtures: Vec<ScheduledMatch>) -> Self {
        self.tournaments.insert(id, fixtures);
        self
    }
}

impl FromIterator<(TournamentId, Vec<ScheduledMatch>)> for StaticSchedule {
    fn from_iter<T: IntoIterator<Item = (TournamentId, Vec<ScheduledMatch>)>>(iter: T) -> Self {
        Self {
            tournaments: iter.into_iter().collect(),
        }
    }
}

impl ScheduleSource for StaticSchedule {
    fn schedule(&self, tournament: &TournamentId) -> Option<Vec<ScheduledMatch>> {
        self.tournaments.get(tournament).cloned()
    }

    fn tournaments(&self) -> Vec<TournamentId> {
        self.tournaments.keys().cloned().collect()
    }
}
