//! Redis-backed L2 store.
//!
//! Values are stored as plain JSON strings with `SETEX`. Once connected, a
//! `ConnectionManager` keeps the connection and reconnects on its own.
//!
//! The retried handshake runs only from [`RedisStore::connect`], off the
//! request path. A request that finds the store unconnected makes a single
//! attempt bounded by the request timeout. After a failed attempt, requests
//! fail fast until the reconnect cooldown has passed.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisResult,
};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::retry::{retry, RetryConfig};
use super::KeyValueStore;
use crate::cache::current_timestamp_ms;
use crate::config::RemoteConfig;
use crate::error::{CacheError, Result};

/// Pause between request-path connect attempts while L2 is unreachable.
pub const RECONNECT_COOLDOWN: Duration = Duration::from_secs(5);

pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    request_timeout: Duration,
    connect_retry: RetryConfig,
    reconnect_cooldown: Duration,
    /// Unix ms before which the request path does not try to connect
    retry_after: AtomicU64,
    connecting: AtomicBool,
}

/// Connection parameters for `config`.
///
/// Built field by field so passwords need no URL escaping.
pub fn connection_info(config: &RemoteConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: config.db,
            password: config.password.clone(),
            ..RedisConnectionInfo::default()
        },
    }
}

impl RedisStore {
    /// Creates the store without touching the network.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::open(connection_info(config))
            .map_err(|e| CacheError::Remote(format!("invalid redis address: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            request_timeout: config.request_timeout,
            connect_retry: RetryConfig::startup(),
            reconnect_cooldown: RECONNECT_COOLDOWN,
            retry_after: AtomicU64::new(0),
            connecting: AtomicBool::new(false),
        })
    }

    /// Overrides the retry policy used by [`RedisStore::connect`].
    pub fn with_connect_retry(mut self, connect_retry: RetryConfig) -> Self {
        self.connect_retry = connect_retry;
        self
    }

    pub fn with_reconnect_cooldown(mut self, cooldown: Duration) -> Self {
        self.reconnect_cooldown = cooldown;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Establishes the connection with the startup retry policy.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let conn = retry("redis_connect", &self.connect_retry, || self.connect_once())
            .await
            .map_err(|e| {
                warn!("Redis connection failed: {}", e);
                e
            })?;
        self.install(conn);
        Ok(())
    }

    /// Runs [`RedisStore::connect`] in the background. Requires a Tokio runtime.
    pub fn spawn_connect(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = store.connect().await {
                warn!("Redis unavailable at startup, serving from L1 until it recovers: {}", e);
            }
        })
    }

    async fn connect_once(&self) -> Result<ConnectionManager> {
        match timeout(self.request_timeout, ConnectionManager::new(self.client.clone())).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Remote(format!(
                "connect timed out after {:?}",
                self.request_timeout
            ))),
        }
    }

    fn install(&self, conn: ConnectionManager) {
        // A concurrent attempt may have won; either manager is usable
        if self.connection.set(conn).is_ok() {
            info!("Redis connection established");
        }
    }

    /// Returns a handle to the shared connection.
    ///
    /// Makes at most one connect attempt at a time, and none while the
    /// cooldown after a failed attempt is running.
    async fn connection(&self) -> Result<ConnectionManager> {
        if let Some(conn) = self.connection.get() {
            return Ok(conn.clone());
        }

        if current_timestamp_ms() < self.retry_after.load(Ordering::Acquire) {
            return Err(CacheError::Remote("not connected, waiting to retry".to_string()));
        }
        let Some(_guard) = ConnectingGuard::acquire(&self.connecting) else {
            return Err(CacheError::Remote("connection attempt in progress".to_string()));
        };

        match self.connect_once().await {
            Ok(conn) => {
                self.install(conn.clone());
                Ok(conn)
            }
            Err(e) => {
                let cooldown_ms = self.reconnect_cooldown.as_millis() as u64;
                self.retry_after
                    .store(current_timestamp_ms().saturating_add(cooldown_ms), Ordering::Release);
                debug!("Redis connect attempt failed: {}", e);
                Err(e)
            }
        }
    }

    /// Runs one command under the per-request timeout.
    async fn run<T, F, Fut>(&self, op: &str, key: &str, command: F) -> Result<T>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = RedisResult<T>>,
    {
        let conn = self.connection().await?;

        match timeout(self.request_timeout, command(conn)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, key, "Redis command failed: {}", e);
                Err(CacheError::Remote(format!("{} '{}' failed: {}", op, key, e)))
            }
            Err(_) => {
                warn!(op, key, "Redis command timed out after {:?}", self.request_timeout);
                Err(CacheError::Remote(format!(
                    "{} '{}' timed out after {:?}",
                    op, key, self.request_timeout
                )))
            }
        }
    }
}

/// Holds the connecting flag; released on drop, including on cancellation.
struct ConnectingGuard<'a>(&'a AtomicBool);

impl<'a> ConnectingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run("GET", key, |mut conn| async move {
            let reply: RedisResult<Option<String>> = conn.get(key).await;
            reply
        })
        .await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        // SETEX rejects a zero expiry
        let ttl_secs = ttl_secs.max(1);
        self.run("SETEX", key, |mut conn| async move {
            let reply: RedisResult<()> = conn.set_ex(key, value, ttl_secs).await;
            reply
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.run("DEL", key, |mut conn| async move {
            let reply: RedisResult<()> = conn.del(key).await;
            reply
        })
        .await
    }

    async fn ping(&self) -> bool {
        let pong = self
            .run("PING", "", |mut conn| async move {
                let reply: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                reply
            })
            .await;

        match pong {
            Ok(reply) => reply == "PONG",
            Err(e) => {
                debug!("Redis ping failed: {}", e);
                false
            }
        }
    }
}
