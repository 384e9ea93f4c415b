use std::io::IsTerminal;

use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::analysis::{BuoyancySummary, RankDeltaRecord, WeekOutcome};

/// How `delta` renders the buoyancy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Csv,
    Json,
}

const COLUMNS: [&str; 17] = [
    "year",
    "week",
    "rank_type",
    "codename",
    "fullname",
    "conf",
    "rank_now",
    "rank_next",
    "ranked_now",
    "ranked_next",
    "won",
    "outcome",
    "rank_delta",
    "teams_jumped",
    "teams_jumped_by",
    "winning_teams_jumped",
    "winning_teams_jumped_by",
];

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Render records in the requested format. Only `Table` uses colors.
pub fn render(records: &[RankDeltaRecord], format: OutputFormat, use_colors: bool) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Table => format_delta_table(records, use_colors),
        OutputFormat::Tsv => format_tsv(records),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Json => {
            let rows: Vec<JsonRecord> = records
                .iter()
                .map(|record| JsonRecord {
                    record,
                    outcome: record.outcome(),
                })
                .collect();
            serde_json::to_string_pretty(&rows)?
        }
    })
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    record: &'a RankDeltaRecord,
    outcome: WeekOutcome,
}

fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Substituted ranks are shown in parentheses
pub fn format_rank(rank: u32, explicit: bool) -> String {
    if explicit {
        rank.to_string()
    } else {
        format!("({})", rank)
    }
}

fn format_delta(delta: i64) -> String {
    if delta > 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Aligned table for the terminal, one transition after another.
/// Columns: year, week, poll, team, now, next, delta, jumped, jumped by, won
pub fn format_delta_table(records: &[RankDeltaRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No ranking transitions found.".to_string();
    }

    let poll_width = records.iter().map(|r| r.rank_type.chars().count()).max().unwrap_or(4).max(4);
    // year(4) week(4) now(5) next(5) delta(5) jumped(6) jumped_by(9) won(3) plus gaps
    let fixed_width = 4 + 4 + poll_width + 5 + 5 + 5 + 6 + 9 + 3 + 2 * 9;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 20 => (width - fixed_width).min(40),
        Some(_) => 20,
        None => 40,
    };

    let header = format!(
        "{:>4}  {:>4}  {:<pw$}  {:<nw$}  {:>5}  {:>5}  {:>5}  {:>6}  {:>9}  {:>3}",
        "year",
        "week",
        "poll",
        "team",
        "now",
        "next",
        "delta",
        "jumped",
        "jumped_by",
        "won",
        pw = poll_width,
        nw = name_width,
    );
    let header = if use_colors { header.bold().to_string() } else { header };

    let mut lines = vec![header];
    for r in records {
        let name = truncate_name(&format!("{} ({})", r.fullname, r.codename), name_width);
        let delta = format!("{:>5}", format_delta(r.rank_delta));
        let delta = if !use_colors || r.rank_delta == 0 {
            delta
        } else if r.rank_delta > 0 {
            delta.green().to_string()
        } else {
            delta.red().to_string()
        };
        // Absent teams had no ranked week to win in
        let outcome = r.outcome();
        let won = match outcome {
            WeekOutcome::Won => "yes",
            WeekOutcome::DidNotWin => "no",
            WeekOutcome::Absent => "-",
        };
        let won = if use_colors && outcome == WeekOutcome::Won {
            won.cyan().to_string()
        } else {
            won.to_string()
        };

        lines.push(format!(
            "{:>4}  {:>4}  {:<pw$}  {:<nw$}  {:>5}  {:>5}  {}  {:>6}  {:>9}  {:>3}",
            r.year,
            r.week,
            r.rank_type,
            name,
            format_rank(r.rank_now, r.ranked_now),
            format_rank(r.rank_next, r.ranked_next),
            delta,
            r.teams_jumped,
            r.teams_jumped_by,
            won,
            pw = poll_width,
            nw = name_width,
        ));
    }
    lines.join("\n")
}

fn record_fields(r: &RankDeltaRecord) -> [String; 17] {
    [
        r.year.to_string(),
        r.week.to_string(),
        r.rank_type.clone(),
        r.codename.clone(),
        r.fullname.clone(),
        r.conf.clone(),
        r.rank_now.to_string(),
        r.rank_next.to_string(),
        r.ranked_now.to_string(),
        r.ranked_next.to_string(),
        r.won.to_string(),
        r.outcome().as_str().to_string(),
        r.rank_delta.to_string(),
        r.teams_jumped.to_string(),
        r.teams_jumped_by.to_string(),
        r.winning_teams_jumped.to_string(),
        r.winning_teams_jumped_by.to_string(),
    ]
}

/// Tab-separated values with a header row, for scripting
pub fn format_tsv(records: &[RankDeltaRecord]) -> String {
    let mut lines = vec![COLUMNS.join("\t")];
    lines.extend(records.iter().map(|r| {
        record_fields(r)
            .iter()
            .map(|f| f.replace(['\t', '\n'], " "))
            .collect::<Vec<_>>()
            .join("\t")
    }));
    lines.join("\n")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Comma-separated values with a header row. Fields are quoted only when needed.
pub fn format_csv(records: &[RankDeltaRecord]) -> String {
    let mut lines = vec![COLUMNS.join(",")];
    lines.extend(records.iter().map(|r| {
        record_fields(r)
            .iter()
            .map(|f| csv_field(f))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// Win/loss comparison per poll
pub fn format_summary(summaries: &[BuoyancySummary], use_colors: bool) -> String {
    if summaries.is_empty() {
        return "No ranked teams to summarize.".to_string();
    }

    let poll_width = summaries.iter().map(|s| s.rank_type.chars().count()).max().unwrap_or(4).max(4);
    let header = format!(
        "{:<pw$}  {:>4}  {:>6}  {:>7}  {:>7}  {:>9}  {:>8}  {:>11}",
        "poll",
        "won",
        "count",
        "delta",
        "jumped",
        "jumped_by",
        "w_jumped",
        "w_jumped_by",
        pw = poll_width,
    );
    let header = if use_colors { header.bold().to_string() } else { header };

    let mut lines = vec![header];
    for s in summaries {
        let delta = format!("{:>7.2}", s.mean_rank_delta);
        let delta = if !use_colors {
            delta
        } else if s.mean_rank_delta > 0.0 {
            delta.green().to_string()
        } else if s.mean_rank_delta < 0.0 {
            delta.red().to_string()
        } else {
            delta
        };
        lines.push(format!(
            "{:<pw$}  {:>4}  {:>6}  {}  {:>7.2}  {:>9.2}  {:>8.2}  {:>11.2}",
            s.rank_type,
            if s.won { "yes" } else { "no" },
            s.count,
            delta,
            s.mean_teams_jumped,
            s.mean_teams_jumped_by,
            s.mean_winning_teams_jumped,
            s.mean_winning_teams_jumped_by,
            pw = poll_width,
        ));
    }
    lines.join("\n")
}
