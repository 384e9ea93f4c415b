use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{WeekRange, YearRange};

const CACHE_FORMAT_VERSION: u32 = 1;

/// Configuration for row-set caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub refresh: bool, // true when --refresh: skip reads, still write
    pub path: PathBuf,
}

impl CacheConfig {
    pub fn new(enabled: bool, refresh: bool) -> Self {
        Self {
            enabled,
            refresh,
            path: get_cache_path(),
        }
    }

    fn reads(&self) -> bool {
        self.enabled && !self.refresh
    }
}

/// Get the platform-appropriate cache directory for cfb-buoyancy
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("cfb-buoyancy/rows"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/cfb-buoyancy/rows",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the row cache directory
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Cache key for a per-week row set ("rankings", "results").
pub fn weekly_key(kind: &str, seasons: YearRange, weeks: WeekRange) -> String {
    format!(
        "{}:y0_{}.y1_{}.w0_{}.w1_{}",
        kind, seasons.start, seasons.end, weeks.start, weeks.end
    )
}

/// Cache key for a per-season row set ("conferences").
pub fn seasonal_key(kind: &str, seasons: YearRange) -> String {
    format!("{}:y0_{}.y1_{}", kind, seasons.start, seasons.end)
}

/// On-disk envelope around one row set
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedRows<T> {
    pub version: u32,
    pub fetched_at: DateTime<Utc>,
    pub rows: Vec<T>,
}

#[derive(Serialize)]
struct CachedRowsRef<'a, T> {
    version: u32,
    fetched_at: DateTime<Utc>,
    rows: &'a [T],
}

/// Read a cached row set. Missing, unreadable or outdated entries are misses.
pub fn read_rows<T: DeserializeOwned>(config: &CacheConfig, key: &str) -> Option<CachedRows<T>> {
    if !config.reads() {
        return None;
    }
    let bytes = cacache::read_sync(&config.path, key).ok()?;
    let cached: CachedRows<T> = match serde_json::from_slice(&bytes) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable cache entry");
            return None;
        }
    };
    if cached.version != CACHE_FORMAT_VERSION {
        tracing::warn!(key, version = cached.version, "ignoring cache entry with unsupported version");
        return None;
    }
    Some(cached)
}

/// Persist a row set under `key`. No-op when caching is disabled.
pub fn write_rows<T: Serialize>(config: &CacheConfig, key: &str, rows: &[T]) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }
    let envelope = CachedRowsRef {
        version: CACHE_FORMAT_VERSION,
        fetched_at: Utc::now(),
        rows,
    };
    let json = serde_json::to_vec(&envelope).context("Failed to serialize cached rows")?;
    cacache::write_sync(&config.path, key, &json)
        .with_context(|| format!("Failed to write cache entry {}", key))?;
    Ok(())
}
