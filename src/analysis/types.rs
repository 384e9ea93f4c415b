use serde::{Deserialize, Serialize};

use crate::espn::Rank;

/// A poll entry after conditioning: never rank 0, always with a conference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTeam {
    pub rank_type: String,
    pub rank: Rank,
    pub codename: String,
    pub fullname: String,
    pub year: i32,
    pub week: u32,
    pub conf: String,
}

/// A decided game: exactly one winner and one distinct loser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub year: i32,
    pub week: u32,
    pub team_0: String,
    pub team_0_full: String,
    pub team_0_pts: u32,
    pub team_1: String,
    pub team_1_full: String,
    pub team_1_pts: u32,
    pub winning_team: String,
    pub losing_team: String,
    pub home_team: Option<String>,
    pub is_neutral_site: bool,
    pub total_pts: u32,
    pub pt_differential: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConditionedTables {
    pub rankings: Vec<RankedTeam>,
    pub results: Vec<GameResult>,
}

/// One team's movement in one poll across a week-to-week transition.
///
/// `rank_now`/`rank_next` are always defined: teams without an explicit rank
/// in a week get that week's deepest rank plus one, and `ranked_now`/
/// `ranked_next` record whether the value was explicit. `won` is false both
/// for losses and for teams absent from week `week`; `ranked_now` tells the
/// two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankDeltaRecord {
    pub year: i32,
    pub week: u32,
    pub rank_type: String,
    pub codename: String,
    pub fullname: String,
    pub conf: String,
    pub rank_now: u32,
    pub rank_next: u32,
    pub ranked_now: bool,
    pub ranked_next: bool,
    pub won: bool,
    pub rank_delta: i64,
    pub teams_jumped: usize,
    pub teams_jumped_by: usize,
    pub winning_teams_jumped: usize,
    pub winning_teams_jumped_by: usize,
}

impl RankDeltaRecord {
    /// Outcome of the team's week, with absence kept distinct from a loss.
    pub fn outcome(&self) -> WeekOutcome {
        if self.won {
            WeekOutcome::Won
        } else if !self.ranked_now {
            WeekOutcome::Absent
        } else {
            WeekOutcome::DidNotWin
        }
    }
}

/// What is known about a team's week-`w` game from the poll and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekOutcome {
    Won,
    /// Lost, or did not play
    DidNotWin,
    /// Not ranked in week `w`, so the result was never looked up
    Absent,
}

impl WeekOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekOutcome::Won => "won",
            WeekOutcome::DidNotWin => "did_not_win",
            WeekOutcome::Absent => "absent",
        }
    }
}
