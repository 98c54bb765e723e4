//! Configuration Module
//!
//! Handles loading cache tier policies, remote connection settings and
//! server settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

// == Tier ==
/// Named cache tier.
///
/// `L3` is declared with its own policy but has no backing store; it is kept
/// as a reserved slot for a future long-lived tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tier {
    L1,
    L2,
    L3,
}

impl Tier {
    /// Built-in default policy for the tier.
    pub fn default_policy(self) -> TierPolicy {
        match self {
            Tier::L1 => TierPolicy::new(300, 1_000),
            Tier::L2 => TierPolicy::new(3_600, 10_000),
            Tier::L3 => TierPolicy::new(86_400, 100_000),
        }
    }
}

// == Tier Policy ==
/// Default TTL and entry bound of a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierPolicy {
    /// Default time-to-live in seconds
    pub ttl_secs: u64,
    /// Maximum number of entries held by the tier
    pub max_entries: usize,
}

impl TierPolicy {
    pub const fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            ttl_secs,
            max_entries,
        }
    }
}

// == Tier Config ==
/// Policies for every declared tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierConfig {
    pub l1: TierPolicy,
    pub l2: TierPolicy,
    pub l3: TierPolicy,
}

impl TierConfig {
    /// Returns the policy of the given tier.
    pub fn policy(&self, tier: Tier) -> TierPolicy {
        match tier {
            Tier::L1 => self.l1,
            Tier::L2 => self.l2,
            Tier::L3 => self.l3,
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            l1: Tier::L1.default_policy(),
            l2: Tier::L2.default_policy(),
            l3: Tier::L3.default_policy(),
        }
    }
}

/// Smallest accepted remote timeout; anything lower fails every command.
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 50;

// == Remote Config ==
/// Connection settings for the remote (L2) store.
#[derive(Clone)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    /// Upper bound for a single remote command
    pub request_timeout: Duration,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("db", &self.db)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            request_timeout: Duration::from_millis(3_000),
        }
    }
}

// == Config ==
/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tier policies
    pub tiers: TierConfig,
    /// Remote store connection
    pub remote: RemoteConfig,
    /// HTTP server port
    pub server_port: u16,
    /// L1 expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Optional JSON file feeding the startup warmup
    pub warmup_file: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_HOST` / `CACHE_PORT` / `CACHE_PASSWORD` / `CACHE_DB` - remote store address
    /// - `CACHE_TIMEOUT_MS` - per-command remote timeout (default: 3000)
    /// - `CACHE_L1_TTL` / `CACHE_L1_MAX_ENTRIES` - L1 policy (default: 300s / 1000)
    /// - `CACHE_L2_TTL` - L2 default TTL (default: 3600)
    /// - `CACHE_L3_TTL` / `CACHE_L3_MAX_ENTRIES` - reserved L3 policy
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - L1 sweep frequency in seconds (default: 60)
    /// - `CACHE_WARMUP_FILE` - warmup payload file (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let tiers = TierConfig {
            l1: TierPolicy::new(
                env_or("CACHE_L1_TTL", defaults.tiers.l1.ttl_secs),
                env_or("CACHE_L1_MAX_ENTRIES", defaults.tiers.l1.max_entries),
            ),
            l2: TierPolicy::new(
                env_or("CACHE_L2_TTL", defaults.tiers.l2.ttl_secs),
                defaults.tiers.l2.max_entries,
            ),
            l3: TierPolicy::new(
                env_or("CACHE_L3_TTL", defaults.tiers.l3.ttl_secs),
                env_or("CACHE_L3_MAX_ENTRIES", defaults.tiers.l3.max_entries),
            ),
        };

        let remote = RemoteConfig {
            host: env::var("CACHE_HOST").unwrap_or(defaults.remote.host),
            port: env_or("CACHE_PORT", defaults.remote.port),
            password: env::var("CACHE_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: env_or("CACHE_DB", defaults.remote.db),
            request_timeout: request_timeout_from_ms(env_or(
                "CACHE_TIMEOUT_MS",
                defaults.remote.request_timeout.as_millis() as u64,
            )),
        };

        Self {
            tiers,
            remote,
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            warmup_file: env::var("CACHE_WARMUP_FILE").ok().filter(|p| !p.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tiers: TierConfig::default(),
            remote: RemoteConfig::default(),
            server_port: 3000,
            cleanup_interval: 60,
            warmup_file: None,
        }
    }
}

/// Remote timeout in milliseconds, floored at [`MIN_REQUEST_TIMEOUT_MS`].
fn request_timeout_from_ms(ms: u64) -> Duration {
    Duration::from_millis(ms.max(MIN_REQUEST_TIMEOUT_MS))
}

/// Reads and parses an environment variable, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.tiers.l1, TierPolicy::new(300, 1_000));
        assert_eq!(config.tiers.l2.ttl_secs, 3_600);
        assert_eq!(config.tiers.l3, TierPolicy::new(86_400, 100_000));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.remote.port, 6379);
        assert!(config.warmup_file.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        for var in [
            "CACHE_L1_TTL",
            "CACHE_L1_MAX_ENTRIES",
            "CACHE_L2_TTL",
            "CACHE_PORT",
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
        ] {
            env::remove_var(var);
        }

        let config = Config::from_env();
        assert_eq!(config.tiers.l1.max_entries, 1_000);
        assert_eq!(config.tiers.l2.ttl_secs, 3_600);
        assert_eq!(config.remote.port, 6379);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("TIERED_CACHE_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("TIERED_CACHE_TEST_GARBAGE", 42u64), 42);
        env::remove_var("TIERED_CACHE_TEST_GARBAGE");
    }

    #[test]
    fn test_request_timeout_is_floored() {
        assert_eq!(request_timeout_from_ms(0), Duration::from_millis(MIN_REQUEST_TIMEOUT_MS));
        assert_eq!(request_timeout_from_ms(3_000), Duration::from_millis(3_000));
    }

    #[test]
    fn test_remote_debug_hides_password() {
        let remote = RemoteConfig {
            password: Some("secret".to_string()),
            ..RemoteConfig::default()
        };
        let rendered = format!("{:?}", remote);
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_policy_lookup() {
        let tiers = TierConfig::default();
        assert_eq!(tiers.policy(Tier::L3).max_entries, 100_000);
        assert_eq!(tiers.policy(Tier::L1), Tier::L1.default_policy());
    }
}
