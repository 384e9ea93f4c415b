use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

use crate::espn::cache::{read_rows, seasonal_key, weekly_key, write_rows, CacheConfig};
use crate::espn::{EspnSource, RawTables};

/// Load rankings, conference membership and results, each from the cache when
/// possible and from ESPN otherwise. Freshly scraped sets are cached.
///
/// Row sets are fetched one after another; a source failure aborts the load
/// without touching entries already cached.
pub async fn load_tables(source: &EspnSource, cache_config: &CacheConfig) -> Result<RawTables> {
    let config = source.config();
    if cache_config.enabled {
        tracing::debug!(path = %cache_config.path.display(), refresh = cache_config.refresh, "cache enabled");
    } else {
        tracing::debug!("cache disabled (--no-cache)");
    }

    let rankings = cached_or_fetch(
        cache_config,
        &weekly_key("rankings", config.seasons, config.weeks),
        || source.fetch_rankings(),
    )
    .await?;

    let conferences = cached_or_fetch(
        cache_config,
        &seasonal_key("conferences", config.seasons),
        || source.fetch_conferences(),
    )
    .await?;

    let results = cached_or_fetch(
        cache_config,
        &weekly_key("results", config.seasons, config.weeks),
        || source.fetch_results(),
    )
    .await?;

    tracing::info!(
        rankings = rankings.len(),
        conferences = conferences.len(),
        results = results.len(),
        "tables loaded"
    );

    Ok(RawTables {
        rankings,
        conferences,
        results,
    })
}

async fn cached_or_fetch<T, F, Fut>(cache_config: &CacheConfig, key: &str, fetch: F) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = crate::error::Result<Vec<T>>>,
{
    if let Some(cached) = read_rows::<T>(cache_config, key) {
        tracing::info!(key, rows = cached.rows.len(), fetched_at = %cached.fetched_at, "using cached rows");
        return Ok(cached.rows);
    }

    tracing::info!(key, "fetching rows");
    let rows = fetch().await?;

    // A failed cache write only costs a re-fetch next time
    if let Err(e) = write_rows(cache_config, key, &rows) {
        tracing::warn!(key, error = %e, "failed to cache rows");
    }
    Ok(rows)
}
