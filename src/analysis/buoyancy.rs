use std::collections::BTreeMap;

use serde::Serialize;

use super::condition::TableConditioner;
use super::delta::{compute_partitions, DeltaPartition};
use super::types::{ConditionedTables, RankDeltaRecord};
use crate::error::Result;
use crate::espn::RawTables;

/// Every transition's records, concatenated in (year, rank_type, week) order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuoyancyTable {
    records: Vec<RankDeltaRecord>,
}

/// Averages over one (rank_type, won) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuoyancySummary {
    pub rank_type: String,
    pub won: bool,
    pub count: usize,
    pub mean_rank_delta: f64,
    pub mean_teams_jumped: f64,
    pub mean_teams_jumped_by: f64,
    pub mean_winning_teams_jumped: f64,
    pub mean_winning_teams_jumped_by: f64,
}

#[derive(Default)]
struct Totals {
    count: usize,
    rank_delta: i64,
    teams_jumped: usize,
    teams_jumped_by: usize,
    winning_teams_jumped: usize,
    winning_teams_jumped_by: usize,
}

impl Totals {
    fn add(&mut self, r: &RankDeltaRecord) {
        self.count += 1;
        self.rank_delta += r.rank_delta;
        self.teams_jumped += r.teams_jumped;
        self.teams_jumped_by += r.teams_jumped_by;
        self.winning_teams_jumped += r.winning_teams_jumped;
        self.winning_teams_jumped_by += r.winning_teams_jumped_by;
    }

    fn mean(&self, total: f64) -> f64 {
        total / self.count as f64
    }
}

impl BuoyancyTable {
    /// Concatenate partitions as given. No reordering or deduplication.
    pub fn from_partitions(partitions: impl IntoIterator<Item = DeltaPartition>) -> Self {
        let records = partitions.into_iter().flat_map(|p| p.records).collect();
        Self { records }
    }

    /// Run the delta engine over conditioned tables.
    pub fn from_tables(tables: &ConditionedTables) -> Self {
        Self::from_partitions(compute_partitions(&tables.rankings, &tables.results))
    }

    pub fn records(&self) -> &[RankDeltaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one transition, in their original order.
    pub fn partition(&self, year: i32, rank_type: &str, week: u32) -> Vec<&RankDeltaRecord> {
        self.records
            .iter()
            .filter(|r| r.year == year && r.week == week && r.rank_type == rank_type)
            .collect()
    }

    /// Group by (rank_type, won) over teams that were ranked in week `w`.
    pub fn summarize(&self) -> Vec<BuoyancySummary> {
        let mut groups: BTreeMap<(&str, bool), Totals> = BTreeMap::new();
        for r in self.records.iter().filter(|r| r.ranked_now) {
            groups.entry((r.rank_type.as_str(), r.won)).or_default().add(r);
        }

        groups
            .into_iter()
            .map(|((rank_type, won), t)| BuoyancySummary {
                rank_type: rank_type.to_string(),
                won,
                count: t.count,
                mean_rank_delta: t.mean(t.rank_delta as f64),
                mean_teams_jumped: t.mean(t.teams_jumped as f64),
                mean_teams_jumped_by: t.mean(t.teams_jumped_by as f64),
                mean_winning_teams_jumped: t.mean(t.winning_teams_jumped as f64),
                mean_winning_teams_jumped_by: t.mean(t.winning_teams_jumped_by as f64),
            })
            .collect()
    }
}

/// Condition raw scraped tables and compute the full buoyancy table.
pub fn build_buoyancy_table(raw: RawTables) -> Result<BuoyancyTable> {
    let tables = TableConditioner::default().condition(raw)?;
    let table = BuoyancyTable::from_tables(&tables);
    tracing::info!(records = table.len(), "buoyancy table built");
    Ok(table)
}
