use anyhow::Result;

use super::html::{attr_value, has_classes, leaf_texts, next_tag_block_ci, strip_tags, tag_blocks};
use super::types::ConferenceRow;

/// Conference membership from one standings page (one season, one division).
pub fn parse_standings_page(html_doc: &str, year: i32) -> Result<Vec<ConferenceRow>> {
    let mut out = Vec::new();

    for table in tag_blocks(html_doc, "<table", "</table>") {
        if !has_classes(table, &["standings", "has-team-logos"]) {
            continue;
        }

        let Some(conf) = conference_name(table) else {
            tracing::debug!(year, "standings table without caption");
            continue;
        };

        for row in tag_blocks(table, "<tr", "</tr>") {
            if let Some((fullname, codename)) = team_of_row(row) {
                out.push(ConferenceRow {
                    fullname,
                    codename,
                    year,
                    conf: conf.clone(),
                });
            }
        }
    }

    Ok(out)
}

/// Caption text; the long name sits in a `<span>` inside `<caption>`.
fn conference_name(table: &str) -> Option<String> {
    let (s, e) = next_tag_block_ci(table, "<caption", "</caption>", 0)?;
    let caption = &table[s..e];
    let name = leaf_texts(caption, "<span", "</span>")
        .into_iter()
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| strip_tags(caption));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Rows name a team as `<span>Full Name</span><abbr>CODE</abbr>`, wrapped in
/// `<a>` for linked teams and in a bare `<span>` otherwise.
fn team_of_row(row: &str) -> Option<(String, String)> {
    let (s, e) = next_tag_block_ci(row, "<abbr", "</abbr>", 0)?;
    let codename = strip_tags(&row[s..e]);
    if codename.is_empty() {
        return None;
    }
    let fullname = leaf_texts(&row[..s], "<span", "</span>")
        .into_iter()
        .rfind(|t| !t.is_empty())
        .or_else(|| attr_value(&row[s..e], "title"))?;
    Some((fullname, codename))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDINGS: &str = r#"
<html><body>
<table class="standings has-team-logos">
  <caption><span>Southeastern Conference</span></caption>
  <tr class="colhead"><td>EAST</td><td>CONF</td></tr>
  <tr><td><a href="/t/61"><span class="team"><span>Georgia</span><abbr>UGA</abbr></span></a></td><td>6-2</td></tr>
  <tr><td><span class="team"><span>Texas A&amp;M</span><abbr>TAMU</abbr></span></td><td>4-4</td></tr>
</table>
<table class="standings has-team-logos">
  <caption><span>Big Sky Conference</span></caption>
  <tr><td><a href="/t/2"><span class="team"><span>Montana</span><abbr>MONT</abbr></span></a></td></tr>
</table>
<table class="schedule"><tr><td><span><span>Ignored</span><abbr>IGN</abbr></span></td></tr></table>
</body></html>"#;

    #[test]
    fn test_parses_linked_and_unlinked_teams() {
        let rows = parse_standings_page(STANDINGS, 2009).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].fullname, "Georgia");
        assert_eq!(rows[0].codename, "UGA");
        assert_eq!(rows[0].conf, "Southeastern Conference");
        assert_eq!(rows[0].year, 2009);

        assert_eq!(rows[1].fullname, "Texas A&M");
        assert_eq!(rows[1].codename, "TAMU");

        assert_eq!(rows[2].conf, "Big Sky Conference");
        assert_eq!(rows[2].codename, "MONT");
    }

    #[test]
    fn test_other_tables_are_ignored() {
        let rows = parse_standings_page(STANDINGS, 2009).unwrap();
        assert!(rows.iter().all(|r| r.codename != "IGN"));
    }

    #[test]
    fn test_caption_without_span() {
        let doc = r#"<table class="standings has-team-logos"><caption>Ivy League</caption>
            <tr><td><span><span>Yale</span><abbr>YALE</abbr></span></td></tr></table>"#;
        let rows = parse_standings_page(doc, 2004).unwrap();
        assert_eq!(rows[0].conf, "Ivy League");
    }
}
