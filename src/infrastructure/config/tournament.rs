//! Static tournament schedules.

use serde::Deserialize;

use crate::adapter::outbound::schedule::StaticSchedule;
use crate::domain::id::TournamentId;
use crate::domain::standings::{ScheduledMatch, GROUP_STAGE_ROUND};

/// One `[[tournaments]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub matches: Vec<MatchConfig>,
}

/// One `[[tournaments.matches]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    pub group: String,
    #[serde(default = "default_round")]
    pub round: String,
    pub home: String,
    pub away: String,
}

fn default_round() -> String {
    GROUP_STAGE_ROUND.into()
}

impl From<&MatchConfig> for ScheduledMatch {
    fn from(m: &MatchConfig) -> Self {
        ScheduledMatch {
            group: m.group.clone(),
            round: m.round.clone(),
            home: m.home.clone(),
            away: m.away.clone(),
        }
    }
}

/// Build the schedule source from configured tournaments.
#[must_use]
pub fn schedule(tournaments: &[TournamentConfig]) -> StaticSchedule {
    tournaments
        .iter()
        .map(|t| {
            (
                TournamentId::from(t.id.as_str()),
                t.matches.iter().map(ScheduledMatch::from).collect(),
            )
        })
        .collect()
}
