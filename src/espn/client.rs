use std::time::Duration;

use anyhow::{Context, Result};
use tokio_retry::{strategy::FixedInterval, Retry};

use crate::error::Error;

const USER_AGENT: &str = concat!("cfb-buoyancy/", env!("CARGO_PKG_VERSION"));

/// Create the HTTP client shared by every page fetch
pub fn create_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")
}

/// Download one page as text.
pub async fn get_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Bad status from {}", url))?;

    response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))
}

/// Fetch `url` and run `parse` on the body. A failed fetch or parse is
/// retried once after `retry_delay`; a second failure becomes
/// `Error::SourceUnavailable`.
pub async fn fetch_parsed<T, P>(
    client: &reqwest::Client,
    url: &str,
    retry_delay: Duration,
    parse: P,
) -> Result<T, Error>
where
    P: Fn(&str) -> Result<T>,
{
    let strategy = FixedInterval::new(retry_delay).take(1);
    Retry::spawn(strategy, || async {
        tracing::info!(url, "loading");
        let body = get_page(client, url).await?;
        parse(&body).inspect_err(|e| {
            tracing::warn!(url, error = %e, "failed to parse page");
        })
    })
    .await
    .map_err(|e| Error::source_unavailable(url, format!("{:#}", e)))
}
