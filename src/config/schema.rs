use serde::{Deserialize, Serialize};

pub const DEFAULT_RANKINGS_URL: &str =
    "http://espn.go.com/college-football/rankings/_/seasontype/2/year/{year}/week/{week}";
pub const DEFAULT_RESULTS_URL: &str =
    "http://espn.go.com/college-football/scoreboard/_/group/80/year/{year}/seasontype/2/week/{week}";
pub const DEFAULT_CONFERENCE_URLS: [&str; 2] = [
    "http://espn.go.com/college-football/standings/_/season/{year}/group/80",
    "http://espn.go.com/college-football/standings/_/season/{year}/view/fcs",
];

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// seasons: { start: 2002, end: 2015 }
/// weeks: { start: 1, end: 15 }
/// request_delay: "500ms"
/// min_poll_size: 20
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_seasons")]
    pub seasons: YearRange,

    #[serde(default = "default_weeks")]
    pub weeks: WeekRange,

    /// Pause between page requests, humantime format ("500ms", "1s")
    #[serde(default = "default_request_delay")]
    pub request_delay: String,

    /// Polls with fewer rows than this are treated as placeholders and skipped
    #[serde(default = "default_min_poll_size")]
    pub min_poll_size: usize,

    #[serde(default)]
    pub sources: SourceUrls,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seasons: default_seasons(),
            weeks: default_weeks(),
            request_delay: default_request_delay(),
            min_poll_size: default_min_poll_size(),
            sources: SourceUrls::default(),
        }
    }
}

/// Inclusive range of seasons
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

/// Inclusive range of regular-season weeks
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WeekRange {
    pub start: u32,
    pub end: u32,
}

impl YearRange {
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl WeekRange {
    pub fn weeks(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// URL templates. `{year}` and `{week}` are substituted per request.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceUrls {
    #[serde(default = "default_rankings_url")]
    pub rankings: String,

    #[serde(default = "default_results_url")]
    pub results: String,

    #[serde(default = "default_conference_urls")]
    pub conferences: Vec<String>,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            rankings: default_rankings_url(),
            results: default_results_url(),
            conferences: default_conference_urls(),
        }
    }
}

/// Fill a URL template for one season/week.
pub fn expand_url(template: &str, year: i32, week: Option<u32>) -> String {
    let url = template.replace("{year}", &year.to_string());
    match week {
        Some(w) => url.replace("{week}", &w.to_string()),
        None => url,
    }
}

fn default_seasons() -> YearRange {
    YearRange { start: 2002, end: 2015 }
}

fn default_weeks() -> WeekRange {
    WeekRange { start: 1, end: 15 }
}

fn default_request_delay() -> String {
    "500ms".to_string()
}

fn default_min_poll_size() -> usize {
    20
}

fn default_rankings_url() -> String {
    DEFAULT_RANKINGS_URL.to_string()
}

fn default_results_url() -> String {
    DEFAULT_RESULTS_URL.to_string()
}

fn default_conference_urls() -> Vec<String> {
    DEFAULT_CONFERENCE_URLS.iter().map(|s| s.to_string()).collect()
}
