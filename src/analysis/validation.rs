use crate::espn::{GameResultRow, Rank, RankingRow};

/// Check conditioned rankings before they reach the delta engine.
/// Returns all violations at once (not just the first).
pub fn validate_rankings(rows: &[(RankingRow, Option<String>)]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (row, conf) in rows {
        if conf.is_none() {
            errors.push(format!(
                "rankings: no conference for {} ({}) in {}",
                row.fullname, row.codename, row.year
            ));
        }
        if row.rank == Rank::Ranked(0) {
            errors.push(format!(
                "rankings: rank 0 for {} in {} {} week {}",
                row.codename, row.rank_type, row.year, row.week
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every surviving game must name a winner and a different loser.
pub fn validate_results(rows: &[GameResultRow]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for row in rows {
        let label = format!("{} vs {} ({} week {})", row.team_0, row.team_1, row.year, row.week);
        match (&row.winning_team, &row.losing_team) {
            (None, _) => errors.push(format!("results: {} has no winner", label)),
            (Some(_), None) => errors.push(format!("results: {} has no loser", label)),
            (Some(w), Some(l)) if w == l => {
                errors.push(format!("results: {} has {} as both winner and loser", label, w))
            }
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
