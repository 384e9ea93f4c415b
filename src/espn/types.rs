use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A poll position. Every explicit rank sorts ahead of `Unranked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ranked(u32),
    Unranked,
}

impl Rank {
    pub fn value(&self) -> Option<u32> {
        match self {
            Rank::Ranked(n) => Some(*n),
            Rank::Unranked => None,
        }
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Rank::Ranked(a), Rank::Ranked(b)) => a.cmp(b),
            (Rank::Ranked(_), Rank::Unranked) => Ordering::Less,
            (Rank::Unranked, Rank::Ranked(_)) => Ordering::Greater,
            (Rank::Unranked, Rank::Unranked) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Ranked(n) => write!(f, "{}", n),
            Rank::Unranked => write!(f, "NR"),
        }
    }
}

/// One team's line in one poll for one week, as scraped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank_type: String, // "ap_poll", "coaches_poll", ...
    pub rank: Rank,
    pub codename: String, // short code, e.g. "OSU"
    pub fullname: String,
    pub year: i32,
    pub week: u32,
}

/// Conference a team belonged to in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceRow {
    pub fullname: String,
    pub codename: String,
    pub year: i32,
    pub conf: String,
}

/// One game from a weekly scoreboard. Winner and loser are absent for
/// unplayed or tied games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResultRow {
    pub year: i32,
    pub week: u32,
    pub team_0: String,
    pub team_0_full: String,
    pub team_0_pts: u32,
    pub team_1: String,
    pub team_1_full: String,
    pub team_1_pts: u32,
    pub winning_team: Option<String>,
    pub losing_team: Option<String>,
    pub home_team: Option<String>,
    pub is_neutral_site: bool,
}

/// The three raw row sets the analysis consumes.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub rankings: Vec<RankingRow>,
    pub conferences: Vec<ConferenceRow>,
    pub results: Vec<GameResultRow>,
}
