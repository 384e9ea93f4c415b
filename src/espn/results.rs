use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use super::types::GameResultRow;

const SCOREBOARD_MARKER: &str = "window.espn.scoreboardData";
const SCOREBOARD_END: &str = ";window.espn";

#[derive(Debug, Deserialize)]
struct Scoreboard {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    competitions: Vec<Competition>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(rename = "neutralSite", default)]
    neutral_site: bool,
    competitors: Vec<Competitor>,
}

#[derive(Debug, Deserialize)]
struct Competitor {
    team: TeamRef,
    score: serde_json::Value, // "24" on most pages, 24 on some
    #[serde(default)]
    winner: bool,
    #[serde(rename = "homeAway", default)]
    home_away: String,
}

#[derive(Debug, Deserialize)]
struct TeamRef {
    abbreviation: String,
    #[serde(rename = "displayName")]
    display_name: String,
}

/// Every game on one weekly scoreboard page.
pub fn parse_scoreboard_page(html_doc: &str, year: i32, week: u32) -> Result<Vec<GameResultRow>> {
    let payload = extract_scoreboard_json(html_doc)
        .ok_or_else(|| anyhow!("no scoreboard data for {} week {}", year, week))?;
    let board: Scoreboard = serde_json::from_str(payload)
        .with_context(|| format!("invalid scoreboard JSON for {} week {}", year, week))?;

    board
        .events
        .iter()
        .map(|event| game_from_event(event, year, week))
        .collect()
}

/// The JSON assigned to `window.espn.scoreboardData` inside a `<script>`.
fn extract_scoreboard_json(html_doc: &str) -> Option<&str> {
    let start = html_doc.find(SCOREBOARD_MARKER)?;
    let after_marker = &html_doc[start + SCOREBOARD_MARKER.len()..];
    let eq = after_marker.find('=')?;
    let body = &after_marker[eq + 1..];
    let end = body
        .find(SCOREBOARD_END)
        .or_else(|| body.find("</script>"))?;
    Some(body[..end].trim().trim_end_matches(';'))
}

fn game_from_event(event: &Event, year: i32, week: u32) -> Result<GameResultRow> {
    let game = event
        .competitions
        .first()
        .ok_or_else(|| anyhow!("event without competitions in {} week {}", year, week))?;

    if game.competitors.len() != 2 {
        return Err(anyhow!(
            "expected 2 competitors, found {} in {} week {}",
            game.competitors.len(),
            year,
            week
        ));
    }
    let (c0, c1) = (&game.competitors[0], &game.competitors[1]);

    let mut winning_team = None;
    let mut losing_team = None;
    let mut home_team = None;
    for c in [c0, c1] {
        // Neither side is flagged as winner for ties and unplayed games
        if c.winner {
            winning_team = Some(c.team.abbreviation.clone());
        } else {
            losing_team = Some(c.team.abbreviation.clone());
        }
        if c.home_away == "home" {
            home_team = Some(c.team.abbreviation.clone());
        }
    }
    if winning_team.is_none() {
        losing_team = None;
    }

    Ok(GameResultRow {
        year,
        week,
        team_0: c0.team.abbreviation.clone(),
        team_0_full: c0.team.display_name.clone(),
        team_0_pts: parse_score(&c0.score)?,
        team_1: c1.team.abbreviation.clone(),
        team_1_full: c1.team.display_name.clone(),
        team_1_pts: parse_score(&c1.score)?,
        winning_team,
        losing_team,
        home_team,
        is_neutral_site: game.neutral_site,
    })
}

fn parse_score(value: &serde_json::Value) -> Result<u32> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        serde_json::Value::String(s) if s.trim().is_empty() => Some(0),
        serde_json::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| anyhow!("invalid score {}", value))
}
