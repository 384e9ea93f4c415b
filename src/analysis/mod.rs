pub mod buoyancy;
pub mod condition;
pub mod delta;
pub mod types;
mod validation;

pub use buoyancy::{build_buoyancy_table, BuoyancySummary, BuoyancyTable};
pub use condition::TableConditioner;
pub use delta::{compute_partitions, jumped, jumped_by, DeltaPartition, WeeklySnapshot};
pub use types::{ConditionedTables, GameResult, RankDeltaRecord, RankedTeam, WeekOutcome};
