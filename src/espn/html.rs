//! Low-level HTML string helpers tailored to the ESPN page layout.
//! Matching is case-insensitive on ASCII tag and attribute names; nothing
//! here builds a DOM.

/// Fast ASCII-only lowercasing for tag/attribute matching.
pub fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// Position of the next opening tag `open_tag` (e.g. `"<span"`) at or after
/// `from` in the lowercased text, skipping longer tag names (`<th` vs `<thead`).
fn find_open_tag(lc: &str, open_tag: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(open_tag)? + pos;
        let next = lc[start + open_tag.len()..].chars().next();
        match next {
            Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/' => return Some(start),
            None => return None,
            _ => pos = start + open_tag.len(),
        }
    }
}

/// Find the next complete tag block from `from` onwards, case-insensitive.
/// A block runs from the start of the opening tag to the end of the first
/// matching closing tag, so nested tags of the same name are not balanced.
pub fn next_tag_block_ci(s: &str, open_tag: &str, close_tag: &str, from: usize) -> Option<(usize, usize)> {
    let lc = to_lowercase_fast(s);
    let open_lc = to_lowercase_fast(open_tag);
    let close_lc = to_lowercase_fast(close_tag);

    let start = find_open_tag(&lc, &open_lc, from)?;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&close_lc)?;
    let end = open_end + end_rel + close_tag.len();
    Some((start, end))
}

/// All non-overlapping blocks of one tag, in document order.
pub fn tag_blocks<'a>(s: &'a str, open_tag: &str, close_tag: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((start, end)) = next_tag_block_ci(s, open_tag, close_tag, pos) {
        out.push(&s[start..end]);
        pos = end;
    }
    out
}

/// Text of every `open_tag` element whose content holds no further markup.
/// Nested wrappers are skipped, so `<span><span>A</span></span>` yields `["A"]`.
pub fn leaf_texts(s: &str, open_tag: &str, close_tag: &str) -> Vec<String> {
    let lc = to_lowercase_fast(s);
    let open_lc = to_lowercase_fast(open_tag);
    let close_lc = to_lowercase_fast(close_tag);

    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(start) = find_open_tag(&lc, &open_lc, pos) {
        pos = start + open_lc.len();
        let Some(open_end) = s[start..].find('>').map(|i| i + start + 1) else {
            break;
        };
        let Some(close) = lc[open_end..].find(&close_lc).map(|i| i + open_end) else {
            break;
        };
        let inner = &s[open_end..close];
        if !inner.contains('<') {
            out.push(clean_text(inner));
        }
    }
    out
}

/// Value of attribute `name` on the opening tag of `block`.
/// Accepts double-quoted, single-quoted and bare values.
pub fn attr_value(block: &str, name: &str) -> Option<String> {
    let open_end = block.find('>').unwrap_or(block.len());
    let opener = &block[..open_end];
    let lc = to_lowercase_fast(opener);
    let needle = format!("{}=", to_lowercase_fast(name));

    let mut pos = 0usize;
    let value_start = loop {
        let idx = lc.get(pos..)?.find(&needle)? + pos;
        // Require a boundary so `data-title=` does not match `title=`
        let boundary = idx == 0 || lc[..idx].ends_with(|c: char| c.is_ascii_whitespace());
        if boundary {
            break idx + needle.len();
        }
        pos = idx + needle.len();
    };

    let rest = &opener[value_start..];
    let value = match rest.chars().next()? {
        q @ ('"' | '\'') => {
            let body = &rest[1..];
            &body[..body.find(q)?]
        }
        _ => {
            let end = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '/')
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };
    Some(normalize_entities(value))
}

/// Whether the opening tag of `block` carries `class` among its classes.
pub fn has_class(block: &str, class: &str) -> bool {
    attr_value(block, "class")
        .map(|v| v.split_ascii_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
        .unwrap_or(false)
}

/// Whether the opening tag of `block` carries every class in `classes`.
pub fn has_classes(block: &str, classes: &[&str]) -> bool {
    classes.iter().all(|c| has_class(block, c))
}

/// Remove all HTML tags `<...>` from the string, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    clean_text(&out)
}

/// Entity decoding plus whitespace collapsing.
pub fn clean_text(s: &str) -> String {
    normalize_ws(&normalize_entities(s))
}

/// Minimal HTML entity decoding for the entities ESPN emits in team names.
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tag_block_skips_longer_tag_names() {
        let s = "<thead><tr><th>x</th></tr></thead>";
        let (start, end) = next_tag_block_ci(s, "<th", "</th>", 0).unwrap();
        assert_eq!(&s[start..end], "<th>x</th>");
    }

    #[test]
    fn test_tag_blocks_case_insensitive() {
        let s = "<TR class=a><td>1</td></TR><tr><td>2</td></tr>";
        let rows = tag_blocks(s, "<tr", "</tr>");
        assert_eq!(rows.len(), 2);
        assert_eq!(strip_tags(rows[1]), "2");
    }

    #[test]
    fn test_leaf_texts_skips_wrappers() {
        let s = "<span class=o><span>Texas A&amp;M</span><abbr>TAMU</abbr></span>";
        assert_eq!(leaf_texts(s, "<span", "</span>"), vec!["Texas A&M".to_string()]);
    }

    #[test]
    fn test_attr_value_quotes() {
        assert_eq!(attr_value(r#"<abbr title="Ohio State">OSU</abbr>"#, "title"), Some("Ohio State".to_string()));
        assert_eq!(attr_value("<abbr title='Ohio State'>OSU</abbr>", "title"), Some("Ohio State".to_string()));
        assert_eq!(attr_value("<td class=number>1</td>", "class"), Some("number".to_string()));
        assert_eq!(attr_value("<abbr>OSU</abbr>", "title"), None);
    }

    #[test]
    fn test_attr_value_requires_boundary() {
        assert_eq!(attr_value(r#"<abbr data-title="x" title="y">"#, "title"), Some("y".to_string()));
    }

    #[test]
    fn test_has_classes() {
        let block = r#"<table class="rankings has-team-logos" id=t>"#;
        assert!(has_classes(block, &["rankings", "has-team-logos"]));
        assert!(!has_class(block, "standings"));
    }

    #[test]
    fn test_strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<p> AP \n <b>Top</b>&nbsp;25 </p>"), "AP Top 25");
    }
}
