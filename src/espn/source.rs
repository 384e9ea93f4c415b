use std::time::Duration;

use crate::config::{expand_url, request_delay, Config};
use crate::error::Result;

use super::client::fetch_parsed;
use super::conferences::parse_standings_page;
use super::rankings::parse_rankings_page;
use super::results::parse_scoreboard_page;
use super::types::{ConferenceRow, GameResultRow, RankingRow};

/// Sequential scraper over the configured seasons and weeks.
///
/// Requests are issued one at a time with `request_delay` between them; the
/// site rate-limits bursts.
pub struct EspnSource {
    client: reqwest::Client,
    config: Config,
    delay: Duration,
}

impl EspnSource {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        let delay = request_delay(&config);
        Self { client, config, delay }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn season_weeks(&self) -> Vec<(i32, u32)> {
        self.config
            .seasons
            .years()
            .flat_map(|y| self.config.weeks.weeks().map(move |w| (y, w)))
            .collect()
    }

    pub async fn fetch_rankings(&self) -> Result<Vec<RankingRow>> {
        let min_poll_size = self.config.min_poll_size;
        let mut rows = Vec::new();
        for (year, week) in self.season_weeks() {
            tokio::time::sleep(self.delay).await;
            let url = expand_url(&self.config.sources.rankings, year, Some(week));
            let page = fetch_parsed(&self.client, &url, self.delay, |html| {
                parse_rankings_page(html, year, week, min_poll_size)
            })
            .await?;
            tracing::debug!(year, week, rows = page.len(), "rankings page parsed");
            rows.extend(page);
        }
        Ok(rows)
    }

    /// Later sources win when a team appears on several standings pages.
    pub async fn fetch_conferences(&self) -> Result<Vec<ConferenceRow>> {
        let mut rows = Vec::new();
        for template in &self.config.sources.conferences {
            for year in self.config.seasons.years() {
                tokio::time::sleep(self.delay).await;
                let url = expand_url(template, year, None);
                let page = fetch_parsed(&self.client, &url, self.delay, |html| {
                    parse_standings_page(html, year)
                })
                .await?;
                tracing::debug!(year, rows = page.len(), "standings page parsed");
                rows.extend(page);
            }
        }
        Ok(rows)
    }

    pub async fn fetch_results(&self) -> Result<Vec<GameResultRow>> {
        let mut rows = Vec::new();
        for (year, week) in self.season_weeks() {
            tokio::time::sleep(self.delay).await;
            let url = expand_url(&self.config.sources.results, year, Some(week));
            let page = fetch_parsed(&self.client, &url, self.delay, |html| {
                parse_scoreboard_page(html, year, week)
            })
            .await?;
            tracing::debug!(year, week, games = page.len(), "scoreboard page parsed");
            rows.extend(page);
        }
        Ok(rows)
    }
}
