//! Week-to-week ranking deltas.
//!
//! For every (season, poll) pair, each week's snapshot is outer-joined with
//! the following week's on team codename. Teams missing from a snapshot take
//! that snapshot's deepest explicit rank plus one, so every row carries a
//! numeric rank in both columns. Jump counts are then pairwise rank-order
//! inversions between the two columns.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::espn::Rank;

use super::types::{GameResult, RankDeltaRecord, RankedTeam};

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub rank: Rank,
    pub won: bool,
    pub fullname: String,
    pub conf: String,
}

/// One poll in one week: codename -> entry. Absent teams are unranked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySnapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl WeeklySnapshot {
    pub fn insert(&mut self, codename: String, entry: SnapshotEntry) {
        self.entries.entry(codename).or_insert(entry);
    }

    pub fn get(&self, codename: &str) -> Option<&SnapshotEntry> {
        self.entries.get(codename)
    }

    pub fn codenames(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Deepest explicit rank, or None when nobody is explicitly ranked.
    pub fn max_rank(&self) -> Option<u32> {
        self.entries.values().filter_map(|e| e.rank.value()).max()
    }

    /// Rank used for comparisons: explicit when present, else `max + 1`.
    /// None only when the snapshot has no explicit ranks at all.
    pub fn effective_rank(&self, codename: &str) -> Option<(u32, bool)> {
        match self.get(codename).and_then(|e| e.rank.value()) {
            Some(r) => Some((r, true)),
            None => self.max_rank().map(|m| (m + 1, false)),
        }
    }

    /// No explicitly ranked team; such a week is treated as missing data.
    pub fn is_empty(&self) -> bool {
        self.max_rank().is_none()
    }
}

/// Snapshots keyed by (year, rank_type), then by week.
pub type SnapshotIndex = BTreeMap<(i32, String), BTreeMap<u32, WeeklySnapshot>>;

/// Records for one (year, rank_type, week) transition.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaPartition {
    pub year: i32,
    pub rank_type: String,
    pub week: u32,
    pub records: Vec<RankDeltaRecord>,
}

/// Keys of every (year, week, winning_team) in the results.
pub fn winners(results: &[GameResult]) -> HashSet<(i32, u32, &str)> {
    results
        .iter()
        .map(|r| (r.year, r.week, r.winning_team.as_str()))
        .collect()
}

/// Group rankings into per-poll weekly snapshots, marking which teams won
/// that week.
pub fn build_snapshots(rankings: &[RankedTeam], results: &[GameResult]) -> SnapshotIndex {
    let won = winners(results);
    let mut index = SnapshotIndex::new();

    for r in rankings {
        let entry = SnapshotEntry {
            rank: r.rank,
            won: won.contains(&(r.year, r.week, r.codename.as_str())),
            fullname: r.fullname.clone(),
            conf: r.conf.clone(),
        };
        index
            .entry((r.year, r.rank_type.clone()))
            .or_default()
            .entry(r.week)
            .or_default()
            .insert(r.codename.clone(), entry);
    }

    index
}

/// Outer-join two consecutive snapshots of one poll into delta records.
/// Returns nothing when either side has no explicit ranks.
pub fn transition_records(
    year: i32,
    week: u32,
    rank_type: &str,
    now: &WeeklySnapshot,
    next: &WeeklySnapshot,
) -> Vec<RankDeltaRecord> {
    if now.is_empty() || next.is_empty() {
        return Vec::new();
    }

    let codenames: BTreeSet<&str> = now.codenames().chain(next.codenames()).collect();

    let mut records: Vec<RankDeltaRecord> = codenames
        .into_iter()
        .filter_map(|code| {
            let (rank_now, ranked_now) = now.effective_rank(code)?;
            let (rank_next, ranked_next) = next.effective_rank(code)?;
            let now_entry = now.get(code);
            let info = now_entry.or_else(|| next.get(code))?;
            Some(RankDeltaRecord {
                year,
                week,
                rank_type: rank_type.to_string(),
                codename: code.to_string(),
                fullname: info.fullname.clone(),
                conf: info.conf.clone(),
                rank_now,
                rank_next,
                ranked_now,
                ranked_next,
                // Absent from week `week`: the result was never joined in
                won: now_entry.is_some_and(|e| e.won),
                rank_delta: i64::from(rank_now) - i64::from(rank_next),
                teams_jumped: 0,
                teams_jumped_by: 0,
                winning_teams_jumped: 0,
                winning_teams_jumped_by: 0,
            })
        })
        .collect();

    records.sort_by(|a, b| {
        (a.rank_now, a.rank_next, &a.codename).cmp(&(b.rank_now, b.rank_next, &b.codename))
    });
    count_jumps(&mut records);
    records
}

/// `other` started ahead of `r` and finished behind it.
fn is_jumped(r: &RankDeltaRecord, other: &RankDeltaRecord) -> bool {
    other.rank_now < r.rank_now && other.rank_next > r.rank_next
}

/// `other` started behind `r` and finished ahead of it.
fn is_jumped_by(r: &RankDeltaRecord, other: &RankDeltaRecord) -> bool {
    other.rank_now > r.rank_now && other.rank_next < r.rank_next
}

/// Teams in the same transition that `records[idx]` overtook.
pub fn jumped(records: &[RankDeltaRecord], idx: usize) -> impl Iterator<Item = &RankDeltaRecord> {
    let r = &records[idx];
    records.iter().filter(move |o| is_jumped(r, o))
}

/// Teams in the same transition that overtook `records[idx]`.
pub fn jumped_by(records: &[RankDeltaRecord], idx: usize) -> impl Iterator<Item = &RankDeltaRecord> {
    let r = &records[idx];
    records.iter().filter(move |o| is_jumped_by(r, o))
}

// O(n^2) over one poll's join, n is at most a few hundred teams
fn count_jumps(records: &mut [RankDeltaRecord]) {
    let counts: Vec<(usize, usize, usize, usize)> = (0..records.len())
        .map(|i| {
            let (mut j, mut wj, mut jb, mut wjb) = (0, 0, 0, 0);
            for other in jumped(records, i) {
                j += 1;
                wj += usize::from(other.won);
            }
            for other in jumped_by(records, i) {
                jb += 1;
                wjb += usize::from(other.won);
            }
            (j, wj, jb, wjb)
        })
        .collect();

    for (r, (j, wj, jb, wjb)) in records.iter_mut().zip(counts) {
        r.teams_jumped = j;
        r.winning_teams_jumped = wj;
        r.teams_jumped_by = jb;
        r.winning_teams_jumped_by = wjb;
    }
}

/// Every week-to-week transition of every poll in every season, ordered by
/// (year, rank_type, week). Transitions without data on both sides are
/// skipped.
pub fn compute_partitions(rankings: &[RankedTeam], results: &[GameResult]) -> Vec<DeltaPartition> {
    let index = build_snapshots(rankings, results);
    let mut partitions = Vec::new();

    for ((year, rank_type), weeks) in &index {
        tracing::debug!(year, rank_type = %rank_type, weeks = weeks.len(), "delta calculation");
        for (&week, now) in weeks {
            let Some(next) = weeks.get(&(week + 1)) else {
                tracing::debug!(year, week, rank_type = %rank_type, "no following week, skipping");
                continue;
            };
            let records = transition_records(*year, week, rank_type, now, next);
            if records.is_empty() {
                tracing::debug!(year, week, rank_type = %rank_type, "empty snapshot, skipping");
                continue;
            }
            partitions.push(DeltaPartition {
                year: *year,
                rank_type: rank_type.clone(),
                week,
                records,
            });
        }
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(rank_type: &str, codename: &str, rank: u32, year: i32, week: u32) -> RankedTeam {
        RankedTeam {
            rank_type: rank_type.to_string(),
            rank: Rank::Ranked(rank),
            codename: codename.to_string(),
            fullname: format!("{} University", codename),
            year,
            week,
            conf: "Test Conference".to_string(),
        }
    }

    fn win(winner: &str, year: i32, week: u32) -> GameResult {
        GameResult {
            year,
            week,
            team_0: winner.to_string(),
            team_0_full: winner.to_string(),
            team_0_pts: 21,
            team_1: "OPP".to_string(),
            team_1_full: "Opponent".to_string(),
            team_1_pts: 7,
            winning_team: winner.to_string(),
            losing_team: "OPP".to_string(),
            home_team: None,
            is_neutral_site: false,
            total_pts: 28,
            pt_differential: 14,
        }
    }

    fn poll(rank_type: &str, year: i32, week: u32, teams: &[(&str, u32)]) -> Vec<RankedTeam> {
        teams
            .iter()
            .map(|(c, r)| team(rank_type, c, *r, year, week))
            .collect()
    }

    fn find<'a>(records: &'a [RankDeltaRecord], codename: &str) -> &'a RankDeltaRecord {
        records.iter().find(|r| r.codename == codename).unwrap()
    }

    fn index_of(records: &[RankDeltaRecord], codename: &str) -> usize {
        records.iter().position(|r| r.codename == codename).unwrap()
    }

    #[test]
    fn test_abc_scenario() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2), ("C", 3)]);
        rankings.extend(poll("ap", 2010, 2, &[("A", 3), ("B", 1), ("C", 2)]));

        let partitions = compute_partitions(&rankings, &[]);
        assert_eq!(partitions.len(), 1);
        let records = &partitions[0].records;

        let b = find(records, "B");
        assert_eq!(b.rank_now, 2);
        assert_eq!(b.rank_next, 1);
        assert_eq!(b.rank_delta, 1);
        assert_eq!(b.teams_jumped, 1);

        let jumped_codes: Vec<&str> = jumped(records, index_of(records, "B"))
            .map(|r| r.codename.as_str())
            .collect();
        assert_eq!(jumped_codes, vec!["A"]);

        let a = find(records, "A");
        assert_eq!(a.teams_jumped_by, 2);
        assert_eq!(a.rank_delta, -2);
    }

    #[test]
    fn test_team_dropping_out_gets_substituted_rank() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2), ("C", 3)]);
        rankings.extend(poll("ap", 2010, 2, &[("A", 1), ("B", 2), ("D", 3)]));
        let results = vec![win("C", 2010, 1)];

        let partitions = compute_partitions(&rankings, &results);
        let records = &partitions[0].records;
        assert_eq!(records.len(), 4);

        let c = find(records, "C");
        assert_eq!(c.rank_now, 3);
        assert_eq!(c.rank_next, 4);
        assert!(c.ranked_now);
        assert!(!c.ranked_next);
        assert_eq!(c.rank_delta, -1);
        assert!(c.won);

        let d = find(records, "D");
        assert_eq!(d.rank_now, 4);
        assert_eq!(d.rank_next, 3);
        assert!(!d.ranked_now);
        assert!(!d.won);
        assert_eq!(d.fullname, "D University");
        assert_eq!(d.teams_jumped, 1);
        assert_eq!(d.winning_teams_jumped, 1);
        assert_eq!(c.teams_jumped_by, 1);
    }

    #[test]
    fn test_won_only_from_current_week() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2)]);
        rankings.extend(poll("ap", 2010, 2, &[("A", 1), ("B", 2), ("N", 3)]));
        // N won in week 1 but was not ranked then
        let results = vec![win("N", 2010, 1), win("A", 2010, 2)];

        let records = &compute_partitions(&rankings, &results)[0].records;
        assert!(!find(records, "N").won);
        assert!(!find(records, "A").won);
    }

    #[test]
    fn test_empty_next_snapshot_emits_nothing() {
        let now = build_snapshots(&poll("ap", 2010, 1, &[("A", 1)]), &[]);
        let now = &now[&(2010, "ap".to_string())][&1];
        let records = transition_records(2010, 1, "ap", now, &WeeklySnapshot::default());
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_following_week_is_skipped() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2)]);
        rankings.extend(poll("ap", 2010, 3, &[("A", 2), ("B", 1)]));
        assert!(compute_partitions(&rankings, &[]).is_empty());
    }

    #[test]
    fn test_last_week_of_season_does_not_join_next_season() {
        let mut rankings = poll("ap", 2010, 15, &[("A", 1), ("B", 2)]);
        rankings.extend(poll("ap", 2011, 16, &[("A", 2), ("B", 1)]));
        assert!(compute_partitions(&rankings, &[]).is_empty());
    }

    #[test]
    fn test_polls_are_independent() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2)]);
        rankings.extend(poll("ap", 2010, 2, &[("A", 2), ("B", 1)]));
        rankings.extend(poll("coaches", 2010, 1, &[("A", 1), ("B", 2)]));
        rankings.extend(poll("coaches", 2010, 2, &[("A", 1), ("B", 2)]));

        let partitions = compute_partitions(&rankings, &[]);
        assert_eq!(partitions.len(), 2);
        assert_eq!(partitions[0].rank_type, "ap");
        assert_eq!(partitions[1].rank_type, "coaches");
        assert!(partitions[1]
            .records
            .iter()
            .all(|r| r.teams_jumped == 0 && r.teams_jumped_by == 0));
        assert_eq!(find(&partitions[0].records, "B").teams_jumped, 1);
    }

    #[test]
    fn test_substitution_uses_each_columns_max() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2), ("C", 3), ("D", 4)]);
        rankings.extend(poll("ap", 2010, 2, &[("E", 1), ("F", 2)]));

        let records = &compute_partitions(&rankings, &[])[0].records;
        assert_eq!(find(records, "E").rank_now, 5);
        assert_eq!(find(records, "A").rank_next, 3);
    }

    #[test]
    fn test_explicit_unranked_row_is_substituted() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 2)]);
        let mut tied = team("ap", "T", 0, 2010, 1);
        tied.rank = Rank::Unranked;
        rankings.push(tied);
        rankings.extend(poll("ap", 2010, 2, &[("T", 1), ("A", 2)]));

        let records = &compute_partitions(&rankings, &[])[0].records;
        let t = find(records, "T");
        assert_eq!(t.rank_now, 3);
        assert!(!t.ranked_now);
        assert_eq!(t.teams_jumped, 2);
    }

    #[test]
    fn test_tied_ranks_do_not_count_as_jumps() {
        let mut rankings = poll("ap", 2010, 1, &[("A", 1), ("B", 1), ("C", 3)]);
        rankings.extend(poll("ap", 2010, 2, &[("A", 2), ("B", 1), ("C", 3)]));

        let records = &compute_partitions(&rankings, &[])[0].records;
        assert_eq!(find(records, "B").teams_jumped, 0);
        assert_eq!(find(records, "A").teams_jumped_by, 0);
    }

    #[test]
    fn test_records_ordered_by_rank() {
        let mut rankings = poll("ap", 2010, 1, &[("Z", 1), ("Y", 2), ("X", 3)]);
        rankings.extend(poll("ap", 2010, 2, &[("Z", 1), ("Y", 2), ("X", 3)]));
        let records = &compute_partitions(&rankings, &[])[0].records;
        let codes: Vec<&str> = records.iter().map(|r| r.codename.as_str()).collect();
        assert_eq!(codes, vec!["Z", "Y", "X"]);
    }

    fn shuffled_polls() -> Vec<DeltaPartition> {
        let now: Vec<(String, u32)> = (1..=25).map(|i| (format!("T{:02}", i), i)).collect();
        // T01 and T02 drop out, T26 and T27 enter; 7 is coprime with 25 so
        // the next-week ranks are a permutation of 1..=25
        let next: Vec<(String, u32)> = (0..25u32)
            .map(|i| (format!("T{:02}", i + 3), (i * 7) % 25 + 1))
            .collect();

        let mut rankings: Vec<RankedTeam> = now
            .iter()
            .map(|(c, r)| team("ap", c, *r, 2012, 4))
            .collect();
        rankings.extend(next.iter().map(|(c, r)| team("ap", c, *r, 2012, 5)));
        let results: Vec<GameResult> = now
            .iter()
            .filter(|(_, r)| r % 2 == 0)
            .map(|(c, _)| win(c, 2012, 4))
            .collect();
        compute_partitions(&rankings, &results)
    }

    #[test]
    fn test_rank_delta_is_exact() {
        for p in shuffled_polls() {
            for r in &p.records {
                assert_eq!(r.rank_delta, i64::from(r.rank_now) - i64::from(r.rank_next));
            }
        }
    }

    #[test]
    fn test_jump_sets_disjoint_and_exclude_self() {
        for p in shuffled_polls() {
            let records = &p.records;
            for i in 0..records.len() {
                let j: HashSet<&str> = jumped(records, i).map(|r| r.codename.as_str()).collect();
                let jb: HashSet<&str> = jumped_by(records, i).map(|r| r.codename.as_str()).collect();
                assert!(j.is_disjoint(&jb));
                assert!(!j.contains(records[i].codename.as_str()));
                assert!(!jb.contains(records[i].codename.as_str()));
                assert_eq!(j.len(), records[i].teams_jumped);
                assert_eq!(jb.len(), records[i].teams_jumped_by);
            }
        }
    }

    #[test]
    fn test_jumps_are_symmetric() {
        for p in shuffled_polls() {
            let records = &p.records;
            for b in 0..records.len() {
                for a in jumped(records, b) {
                    let a_idx = index_of(records, &a.codename);
                    assert!(jumped_by(records, a_idx).any(|r| r.codename == records[b].codename));
                }
            }
            let total_jumped: usize = records.iter().map(|r| r.teams_jumped).sum();
            let total_jumped_by: usize = records.iter().map(|r| r.teams_jumped_by).sum();
            assert_eq!(total_jumped, total_jumped_by);
        }
    }

    #[test]
    fn test_winning_counts_bounded_by_totals() {
        for p in shuffled_polls() {
            for r in &p.records {
                assert!(r.winning_teams_jumped <= r.teams_jumped);
                assert!(r.winning_teams_jumped_by <= r.teams_jumped_by);
            }
        }
    }

    #[test]
    fn test_unchanged_order_has_no_jumps() {
        let teams: Vec<(String, u32)> = (1..=25).map(|i| (format!("T{}", i), i)).collect();
        let mut rankings: Vec<RankedTeam> = teams.iter().map(|(c, r)| team("ap", c, *r, 2010, 6)).collect();
        // Same order, every rank shifted by one
        rankings.extend(teams.iter().map(|(c, r)| team("ap", c, r + 1, 2010, 7)));

        for r in &compute_partitions(&rankings, &[])[0].records {
            assert_eq!(r.teams_jumped, 0);
            assert_eq!(r.teams_jumped_by, 0);
        }
    }
}
