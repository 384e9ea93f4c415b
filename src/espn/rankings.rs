use anyhow::{bail, Result};

use super::html::{attr_value, clean_text, has_class, has_classes, next_tag_block_ci, strip_tags, tag_blocks};
use super::types::{Rank, RankingRow};

/// Every poll table on one weekly rankings page.
///
/// Tables with fewer than `min_poll_size` rows are skipped: early-season
/// pages often list only last year's champion.
pub fn parse_rankings_page(html_doc: &str, year: i32, week: u32, min_poll_size: usize) -> Result<Vec<RankingRow>> {
    let tables: Vec<&str> = tag_blocks(html_doc, "<table", "</table>")
        .into_iter()
        .filter(|t| has_classes(t, &["rankings", "has-team-logos"]))
        .collect();

    if tables.is_empty() {
        tracing::debug!(year, week, "no rankings tables on page");
    }

    let mut out = Vec::new();
    for table in tables {
        let rank_type = match next_tag_block_ci(table, "<caption", "</caption>", 0) {
            Some((s, e)) => rank_type_from_caption(&table[s..e]),
            None => bail!("rankings table without caption for {} week {}", year, week),
        };

        // Header rows live in <thead>; only <tbody> rows are teams
        let rows = match next_tag_block_ci(table, "<tbody", "</tbody>", 0) {
            Some((s, e)) => tag_blocks(&table[s..e], "<tr", "</tr>"),
            None => Vec::new(),
        };

        if rows.len() < min_poll_size {
            tracing::debug!(year, week, rank_type = %rank_type, rows = rows.len(), "skipping short poll");
            continue;
        }

        let mut last_rank = Rank::Unranked;
        for row in rows {
            let Some((fullname, codename)) = team_of_row(row) else {
                bail!("{} row without a team for {} week {}", rank_type, year, week);
            };
            // Ties are printed as an empty rank cell
            let rank = rank_of_row(row).unwrap_or(last_rank);
            out.push(RankingRow {
                rank_type: rank_type.clone(),
                rank,
                codename,
                fullname,
                year,
                week,
            });
            last_rank = rank;
        }
    }

    Ok(out)
}

/// "AP Poll" -> "ap_poll"
pub fn rank_type_from_caption(caption_block: &str) -> String {
    strip_tags(caption_block).to_lowercase().replace(' ', "_")
}

fn rank_of_row(row: &str) -> Option<Rank> {
    tag_blocks(row, "<span", "</span>")
        .into_iter()
        .find(|span| has_class(span, "number"))
        .and_then(|span| strip_tags(span).parse::<u32>().ok())
        .map(Rank::Ranked)
}

/// (fullname, codename) from the row's `<abbr title="Full Name">CODE</abbr>`.
/// Linked teams wrap the abbr in `<a>`, unlinked ones in `<span>`.
fn team_of_row(row: &str) -> Option<(String, String)> {
    let (s, e) = next_tag_block_ci(row, "<abbr", "</abbr>", 0)?;
    let abbr = &row[s..e];
    let codename = strip_tags(abbr);
    if codename.is_empty() {
        return None;
    }
    let fullname = attr_value(abbr, "title")
        .map(|t| clean_text(&t))
        .unwrap_or_else(|| codename.clone());
    Some((fullname, codename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_row(rank: Option<u32>, code: &str, full: &str, linked: bool) -> String {
        let rank_cell = match rank {
            Some(r) => format!(r#"<td><span class="number">{}</span></td>"#, r),
            None => r#"<td><span class="number"></span></td>"#.to_string(),
        };
        let team = if linked {
            format!(r#"<a href="/team/{c}"><abbr title="{f}">{c}</abbr></a>"#, c = code, f = full)
        } else {
            format!(r#"<span><abbr title="{f}">{c}</abbr></span>"#, c = code, f = full)
        };
        format!("<tr>{}<td>{}</td><td>10-0</td></tr>", rank_cell, team)
    }

    fn poll_table(caption: &str, rows: &[String]) -> String {
        format!(
            r#"<table class="rankings has-team-logos"><caption>{}</caption><thead><tr><th>RK</th></tr></thead><tbody>{}</tbody></table>"#,
            caption,
            rows.concat()
        )
    }

    fn full_poll(caption: &str, n: u32) -> String {
        let rows: Vec<String> = (1..=n)
            .map(|i| poll_row(Some(i), &format!("T{}", i), &format!("Team {}", i), true))
            .collect();
        poll_table(caption, &rows)
    }

    #[test]
    fn test_parses_each_poll_table() {
        let doc = format!("<html><body>{}{}</body></html>", full_poll("AP Poll", 25), full_poll("Coaches Poll", 25));
        let rows = parse_rankings_page(&doc, 2010, 4, 20).unwrap();

        assert_eq!(rows.len(), 50);
        assert_eq!(rows[0].rank_type, "ap_poll");
        assert_eq!(rows[0].rank, Rank::Ranked(1));
        assert_eq!(rows[0].codename, "T1");
        assert_eq!(rows[0].fullname, "Team 1");
        assert_eq!(rows[0].year, 2010);
        assert_eq!(rows[0].week, 4);
        assert_eq!(rows[25].rank_type, "coaches_poll");
    }

    #[test]
    fn test_tied_row_inherits_previous_rank() {
        let mut rows: Vec<String> = (1..=20)
            .map(|i| poll_row(Some(i), &format!("T{}", i), "x", true))
            .collect();
        rows.insert(5, poll_row(None, "TIE", "Tied Team", false));
        let doc = poll_table("AP Poll", &rows);

        let parsed = parse_rankings_page(&doc, 2003, 2, 20).unwrap();
        let tie = parsed.iter().find(|r| r.codename == "TIE").unwrap();
        assert_eq!(tie.rank, Rank::Ranked(5));
        assert_eq!(tie.fullname, "Tied Team");
    }

    #[test]
    fn test_leading_tie_is_unranked() {
        let mut rows: Vec<String> = (1..=20)
            .map(|i| poll_row(Some(i), &format!("T{}", i), "x", true))
            .collect();
        rows.insert(0, poll_row(None, "LEAD", "Lead", true));
        let doc = poll_table("AP Poll", &rows);

        let parsed = parse_rankings_page(&doc, 2003, 2, 20).unwrap();
        assert_eq!(parsed[0].rank, Rank::Unranked);
        assert_eq!(parsed[1].rank, Rank::Ranked(1));
    }

    #[test]
    fn test_short_poll_is_skipped() {
        let doc = format!("{}{}", full_poll("AP Poll", 1), full_poll("Coaches Poll", 25));
        let rows = parse_rankings_page(&doc, 2003, 1, 20).unwrap();
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.rank_type == "coaches_poll"));
    }

    #[test]
    fn test_page_without_tables_is_empty() {
        let rows = parse_rankings_page("<html><body>No rankings</body></html>", 2003, 1, 20).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_row_without_team_is_an_error() {
        let mut rows: Vec<String> = (1..=20)
            .map(|i| poll_row(Some(i), &format!("T{}", i), "x", true))
            .collect();
        rows.push("<tr><td>garbage</td></tr>".to_string());
        let doc = poll_table("AP Poll", &rows);
        assert!(parse_rankings_page(&doc, 2003, 1, 20).is_err());
    }

    #[test]
    fn test_table_without_tbody_has_no_rows() {
        let header_rows = "<tr><th>RK</th><th>Team</th></tr>".repeat(25);
        let doc = format!(
            r#"<table class="rankings has-team-logos"><caption>AP Poll</caption><thead>{}</thead></table>{}"#,
            header_rows,
            full_poll("Coaches Poll", 25)
        );
        let rows = parse_rankings_page(&doc, 2007, 3, 20).unwrap();
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.rank_type == "coaches_poll"));
    }

    #[test]
    fn test_rank_type_from_caption() {
        assert_eq!(
            rank_type_from_caption("<caption>NCAA College Football Power Rankings</caption>"),
            "ncaa_college_football_power_rankings"
        );
    }
}
