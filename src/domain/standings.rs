//! Group-stage standings derived from resolved match markets.
//!
//! Standings are never stored. Every call scans the full set of resolved
//! markets from scratch, so the result does not depend on the order in
//! which matches resolved.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::id::TournamentId;
use super::market::Market;

/// Schedule round that feeds the group tables.
pub const GROUP_STAGE_ROUND: &str = "Group Stage";

/// How many teams per group advance.
pub const ADVANCING_PER_GROUP: usize = 2;

const POINTS_WIN: u32 = 3;
const POINTS_DRAW: u32 = 1;

/// One fixture from the static tournament schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub group: String,
    pub round: String,
    pub home: String,
    pub away: String,
}

impl ScheduledMatch {
    pub fn group_stage(
        group: impl Into<String>,
        home: impl Into<String>,
        away: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            round: GROUP_STAGE_ROUND.to_string(),
            home: home.into(),
            away: away.into(),
        }
    }

    /// Question text of the market that tracks this fixture.
    #[must_use]
    pub fn market_question(&self) -> String {
        match_question(&self.home, &self.away)
    }

    #[must_use]
    pub fn is_group_stage(&self) -> bool {
        self.round == GROUP_STAGE_ROUND
    }
}

/// Market question used for a fixture: `"{home} - {away}"`.
#[must_use]
pub fn match_question(home: &str, away: &str) -> String {
    format!("{home} - {away}")
}

/// Result of a fixture, from the resolved option index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl MatchOutcome {
    /// 0 = home win, 1 = away win, 2 = draw.
    #[must_use]
    pub const fn from_option_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(MatchOutcome::HomeWin),
            1 => Some(MatchOutcome::AwayWin),
            2 => Some(MatchOutcome::Draw),
            _ => None,
        }
    }
}

/// One team's line in a group table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    /// Always 0 until match scores are ingested.
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
    /// 1-based position after sorting.
    pub rank: usize,
    pub advances: bool,
}

impl StandingsRow {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
            rank: 0,
            advances: false,
        }
    }

    fn record_win(&mut self) {
        self.played += 1;
        self.won += 1;
        self.points += POINTS_WIN;
    }

    fn record_draw(&mut self) {
        self.played += 1;
        self.drawn += 1;
        self.points += POINTS_DRAW;
    }

    fn record_loss(&mut self) {
        self.played += 1;
        self.lost += 1;
    }
}

fn table_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_difference.cmp(&a.goal_difference))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team.cmp(&b.team))
}

/// Sorted table for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTable {
    pub group: String,
    pub rows: Vec<StandingsRow>,
}

impl GroupTable {
    #[must_use]
    pub fn row(&self, team: &str) -> Option<&StandingsRow> {
        self.rows.iter().find(|row| row.team == team)
    }
}

/// Standings for every group of a tournament, groups in name order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentStandings {
    pub tournament_id: TournamentId,
    pub groups: Vec<GroupTable>,
    /// Fixtures whose market was resolved and counted.
    pub matches_counted: usize,
}

impl TournamentStandings {
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupTable> {
        self.groups.iter().find(|g| g.group == name)
    }
}

/// Build standings from the schedule and the tournament's markets.
///
/// Only group-stage fixtures count. A fixture is linked to the market of the
/// same tournament whose trimmed question equals [`match_question`].
#[must_use]
pub fn derive_standings(
    tournament_id: &TournamentId,
    schedule: &[ScheduledMatch],
    markets: &[Market],
) -> TournamentStandings {
    let resolved: HashMap<&str, u8> = markets
        .iter()
        .filter(|m| m.tournament_id.as_ref() == Some(tournament_id) && m.is_resolved())
        .filter_map(|m| m.resolved_option.map(|option| (m.question.trim(), option)))
        .collect();

    let mut tables: BTreeMap<&str, Vec<StandingsRow>> = BTreeMap::new();
    let mut matches_counted = 0;

    for fixture in schedule.iter().filter(|f| f.is_group_stage()) {
        let rows = tables.entry(fixture.group.as_str()).or_default();
        let home = team_index(rows, &fixture.home);
        let away = team_index(rows, &fixture.away);

        let question = fixture.market_question();
        let Some(&option) = resolved.get(question.as_str()) else {
            continue;
        };
        let Some(outcome) = MatchOutcome::from_option_index(option) else {
            warn!(
                tournament = %tournament_id,
                fixture = %question,
                option,
                "Resolved option has no match outcome, skipping"
            );
            continue;
        };

        match outcome {
            MatchOutcome::HomeWin => {
                rows[home].record_win();
                rows[away].record_loss();
            }
            MatchOutcome::AwayWin => {
                rows[home].record_loss();
                rows[away].record_win();
            }
            MatchOutcome::Draw => {
                rows[home].record_draw();
                rows[away].record_draw();
            }
        }
        matches_counted += 1;
    }

    let groups = tables
        .into_iter()
        .map(|(group, mut rows)| {
            rows.sort_by(table_order);
            for (i, row) in rows.iter_mut().enumerate() {
                row.rank = i + 1;
                row.advances = i < ADVANCING_PER_GROUP;
            }
            GroupTable {
                group: group.to_string(),
                rows,
            }
        })
        .collect();

    TournamentStandings {
        tournament_id: tournament_id.clone(),
        groups,
        matches_counted,
    }
}

fn team_index(rows: &mut Vec<StandingsRow>, team: &str) -> usize {
    if let Some(i) = rows.iter().position(|row| row.team == team) {
        return i;
    }
    rows.push(StandingsRow::new(team));
    rows.len() - 1
}
