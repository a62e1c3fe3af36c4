//! Handler for `standings`.

use serde_json::json;
use tabled::Tabled;

use super::output;
use crate::domain::id::TournamentId;
use crate::domain::standings::{GroupTable, TournamentStandings};
use crate::error::Result;
use crate::infrastructure::bootstrap::SqliteCore;

#[derive(Tabled)]
struct StandingsLine {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Team")]
    team: String,
    #[tabled(rename = "P")]
    played: u32,
    #[tabled(rename = "W")]
    won: u32,
    #[tabled(rename = "D")]
    drawn: u32,
    #[tabled(rename = "L")]
    lost: u32,
    #[tabled(rename = "GD")]
    goal_difference: i32,
    #[tabled(rename = "Pts")]
    points: u32,
}

/// One group as table rows, advancing teams picked out.
fn group_rows(table: &GroupTable) -> Vec<StandingsLine> {
    table
        .rows
        .iter()
        .map(|row| StandingsLine {
            rank: row.rank,
            team: if row.advances {
                output::emphasis(&row.team)
            } else {
                row.team.clone()
            },
            played: row.played,
            won: row.won,
            drawn: row.drawn,
            lost: row.lost,
            goal_difference: row.goal_difference,
            points: row.points,
        })
        .collect()
}

pub(crate) fn print_standings(standings: &TournamentStandings) {
    for group in &standings.groups {
        output::section(&group.group);
        output::table(group_rows(group));
    }
    output::note(&format!("{} match(es) counted", standings.matches_counted));
}

/// Execute `standings`.
pub async fn execute(core: &SqliteCore, tournament: Option<&str>) -> Result<()> {
    let Some(tournament) = tournament else {
        return list_tournaments(core);
    };
    let standings = core
        .standings
        .compute_standings(&TournamentId::from(tournament))
        .await?;

    if output::is_json() {
        output::document(json!({
            "command": "standings",
            "standings": standings,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Tournament", &standings.tournament_id);
    print_standings(&standings);
    Ok(())
}

fn list_tournaments(core: &SqliteCore) -> Result<()> {
    let tournaments = core.standings.tournaments();

    if output::is_json() {
        output::document(json!({
            "command": "standings.tournaments",
            "tournaments": tournaments,
        }));
        return Ok(());
    }

    output::section("Tournaments");
    if tournaments.is_empty() {
        output::note("(none configured; add [[tournaments]] to the config)");
    }
    for id in &tournaments {
        output::note(&format!("- {id}"));
    }
    Ok(())
}
