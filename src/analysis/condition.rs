use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::espn::{ConferenceRow, GameResultRow, Rank, RankingRow, RawTables};

use super::types::{ConditionedTables, GameResult, RankedTeam};
use super::validation::{validate_rankings, validate_results};

/// Conference set by hand for a team the standings pages never list.
#[derive(Debug, Clone, PartialEq)]
pub struct ConferenceOverride {
    pub fullname: &'static str,
    pub year: Option<i32>, // None: every season
    pub conf: &'static str,
}

/// A poll whose pages cannot be parsed up to and including `last_bad_year`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedPoll {
    pub rank_type: &'static str,
    pub last_bad_year: i32,
}

pub const CONFERENCE_OVERRIDES: &[ConferenceOverride] = &[
    ConferenceOverride {
        fullname: "UC Davis",
        year: Some(2003),
        conf: "D2 Independent",
    },
    ConferenceOverride {
        fullname: "UC Davis",
        year: Some(2004),
        conf: "Great West Conference",
    },
    ConferenceOverride {
        fullname: "North Dakota State",
        year: None,
        conf: "Great West Conference",
    },
];

pub const EXCLUDED_POLLS: &[ExcludedPoll] = &[ExcludedPoll {
    rank_type: "ncaa_college_football_power_rankings",
    last_bad_year: 2005,
}];

/// Filters and repairs raw rows into tables the delta engine can trust.
#[derive(Debug, Clone)]
pub struct TableConditioner {
    pub overrides: &'static [ConferenceOverride],
    pub excluded_polls: &'static [ExcludedPoll],
}

impl Default for TableConditioner {
    fn default() -> Self {
        Self {
            overrides: CONFERENCE_OVERRIDES,
            excluded_polls: EXCLUDED_POLLS,
        }
    }
}

impl TableConditioner {
    pub fn condition(&self, raw: RawTables) -> Result<ConditionedTables> {
        let rankings = self.condition_rankings(raw.rankings, &raw.conferences)?;
        let results = condition_results(raw.results)?;
        tracing::info!(rankings = rankings.len(), results = results.len(), "tables conditioned");
        Ok(ConditionedTables { rankings, results })
    }

    pub fn condition_rankings(&self, rankings: Vec<RankingRow>, conferences: &[ConferenceRow]) -> Result<Vec<RankedTeam>> {
        // Rank 0 is a site artifact meaning "not actually ranked"
        let rankings: Vec<RankingRow> = rankings
            .into_iter()
            .filter(|r| r.rank != Rank::Ranked(0))
            .collect();

        let mut joined = attach_conferences(rankings, conferences);
        self.apply_overrides(&mut joined);

        let joined: Vec<(RankingRow, Option<String>)> = joined
            .into_iter()
            .filter(|(r, _)| !self.is_excluded(r))
            .collect();
        let joined = drop_duplicates(joined);

        validate_rankings(&joined).map_err(|errors| Error::integrity(&errors))?;

        Ok(joined
            .into_iter()
            .filter_map(|(row, conf)| {
                conf.map(|conf| RankedTeam {
                    rank_type: row.rank_type,
                    rank: row.rank,
                    codename: row.codename,
                    fullname: row.fullname,
                    year: row.year,
                    week: row.week,
                    conf,
                })
            })
            .collect())
    }

    fn apply_overrides(&self, rows: &mut [(RankingRow, Option<String>)]) {
        for (row, conf) in rows.iter_mut() {
            for o in self.overrides {
                if row.fullname == o.fullname && o.year.is_none_or(|y| y == row.year) {
                    *conf = Some(o.conf.to_string());
                }
            }
        }
    }

    fn is_excluded(&self, row: &RankingRow) -> bool {
        self.excluded_polls
            .iter()
            .any(|p| p.rank_type == row.rank_type && row.year <= p.last_bad_year)
    }
}

/// Left join on (codename, year). A later membership row for the same key
/// replaces an earlier one.
fn attach_conferences(rankings: Vec<RankingRow>, conferences: &[ConferenceRow]) -> Vec<(RankingRow, Option<String>)> {
    let mut by_team: HashMap<(&str, i32), &str> = HashMap::new();
    for c in conferences {
        by_team.insert((c.codename.as_str(), c.year), c.conf.as_str());
    }

    rankings
        .into_iter()
        .map(|row| {
            let conf = by_team
                .get(&(row.codename.as_str(), row.year))
                .map(|c| c.to_string());
            (row, conf)
        })
        .collect()
}

/// Keep the first row per (rank_type, codename, year, week).
fn drop_duplicates(rows: Vec<(RankingRow, Option<String>)>) -> Vec<(RankingRow, Option<String>)> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|(r, _)| {
            let fresh = seen.insert((r.rank_type.clone(), r.codename.clone(), r.year, r.week));
            if !fresh {
                tracing::warn!(
                    rank_type = %r.rank_type,
                    codename = %r.codename,
                    year = r.year,
                    week = r.week,
                    "dropping duplicate ranking row"
                );
            }
            fresh
        })
        .collect()
}

/// Keep decided games only and derive point totals.
pub fn condition_results(results: Vec<GameResultRow>) -> Result<Vec<GameResult>> {
    let decided: Vec<GameResultRow> = results
        .into_iter()
        .filter(|r| r.winning_team.is_some())
        .collect();

    validate_results(&decided).map_err(|errors| Error::integrity(&errors))?;

    Ok(decided
        .into_iter()
        .filter_map(|r| {
            let (winning_team, losing_team) = (r.winning_team?, r.losing_team?);
            Some(GameResult {
                year: r.year,
                week: r.week,
                total_pts: r.team_0_pts + r.team_1_pts,
                pt_differential: r.team_1_pts.abs_diff(r.team_0_pts),
                team_0: r.team_0,
                team_0_full: r.team_0_full,
                team_0_pts: r.team_0_pts,
                team_1: r.team_1,
                team_1_full: r.team_1_full,
                team_1_pts: r.team_1_pts,
                winning_team,
                losing_team,
                home_team: r.home_team,
                is_neutral_site: r.is_neutral_site,
            })
        })
        .collect())
}
