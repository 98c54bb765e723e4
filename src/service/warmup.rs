//! Startup warmup: pre-populates both tiers with frequently read keys.

use std::path::Path;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::CacheService;

/// Keys loaded by [`CacheService::warmup`].
pub const WARMUP_KEYS: [&str; 3] = ["products:top", "search:popular", "categories:all"];

/// Provider of warmup payloads, typically backed by the primary database.
#[async_trait]
pub trait WarmupSource: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Value>;
}

/// Outcome of a warmup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Warmup payloads read from a JSON object keyed by cache key.
#[derive(Debug, Clone, Default)]
pub struct FileWarmupSource {
    entries: Map<String, Value>,
}

impl FileWarmupSource {
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Reads and parses `path`, which must hold a JSON object.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading warmup file {}", path.display()))?;
        let entries: Map<String, Value> = serde_json::from_str(&text)
            .with_context(|| format!("parsing warmup file {}", path.display()))?;
        Ok(Self::from_map(entries))
    }
}

#[async_trait]
impl WarmupSource for FileWarmupSource {
    async fn load(&self, key: &str) -> anyhow::Result<Value> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("no warmup payload for '{}'", key))
    }
}

impl CacheService {
    // == Warmup ==
    /// Loads [`WARMUP_KEYS`] from `source` into both tiers.
    pub async fn warmup(&self, source: &dyn WarmupSource) -> WarmupReport {
        self.warmup_keys(source, &WARMUP_KEYS).await
    }

    /// Loads the given keys from `source` into both tiers with the L2
    /// default TTL. Failing items are logged and skipped.
    pub async fn warmup_keys(&self, source: &dyn WarmupSource, keys: &[&str]) -> WarmupReport {
        let mut report = WarmupReport::default();

        for key in keys {
            let outcome = match source.load(key).await {
                Ok(value) => self.set(key, &value, None).await.map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(key = *key, "Warmup skipped key: {:#}", e);
                }
            }
        }

        info!(loaded = report.loaded, failed = report.failed, "Cache warmup finished");
        report
    }
}
