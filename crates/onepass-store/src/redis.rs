use async_trait::async_trait;
use onepass_core::{AccessToken, BindingContext, StoreError, TokenStore};
use redis::Script;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Default namespace for token keys.
pub const DEFAULT_KEY_PREFIX: &str = "p_access:";

/// Reads and deletes a key inside a single script execution. Redis runs
/// scripts without interleaving other commands, so this is as atomic as
/// `GETDEL`.
const TAKE_SCRIPT: &str = r"
local value = redis.call('GET', KEYS[1])
if value then
  redis.call('DEL', KEYS[1])
end
return value
";

/// How [`RedisTokenStore`] performs its atomic fetch-and-remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// The native `GETDEL` command (Redis 6.2 and later).
    #[default]
    GetDel,
    /// A server-side script, for servers that predate `GETDEL`.
    Script,
}

/// A Redis-based implementation of [`TokenStore`].
///
/// Contexts are stored as JSON strings under `{prefix}{token}`. Writes use
/// `SET NX PX` so a live key is never overwritten and Redis owns the TTL.
#[derive(Clone)]
pub struct RedisTokenStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
    strategy: FetchStrategy,
    take_script: Script,
}

impl std::fmt::Debug for RedisTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTokenStore")
            .field("key_prefix", &self.key_prefix)
            .field("strategy", &self.strategy)
            .finish()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

impl RedisTokenStore {
    /// Creates a new Redis token store with the default key prefix and
    /// `GETDEL` fetching.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis token store with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Namespace for token keys (e.g., "myapp:access:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            strategy: FetchStrategy::default(),
            take_script: Script::new(TAKE_SCRIPT),
        }
    }

    /// Selects how fetch-and-remove is performed.
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Generates the store key for a token.
    fn store_key(&self, token: &AccessToken) -> String {
        format!("{}{}", self.key_prefix, token.as_str())
    }

    async fn take_raw(&self, key: &str) -> redis::RedisResult<Option<String>> {
        let mut conn = self.conn.clone();
        match self.strategy {
            FetchStrategy::GetDel => redis::cmd("GETDEL").arg(key).query_async(&mut conn).await,
            FetchStrategy::Script => self.take_script.key(key).invoke_async(&mut conn).await,
        }
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn set_with_expiry(
        &self,
        token: &AccessToken,
        context: &BindingContext,
        ttl: Duration,
    ) -> Result<bool> {
        let key = self.store_key(token);
        trace!(token = token.fingerprint(), "Storing binding context in Redis");

        let json = serde_json::to_string(context).map_err(|e| {
            warn!(token = token.fingerprint(), error = %e, "Failed to serialize binding context");
            StoreError::Serialization(format!("failed to serialize binding context: {e}"))
        })?;

        // PX rejects zero, so clamp to the smallest expiry Redis accepts.
        let ttl_ms = ttl.as_millis().max(1) as u64;

        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(json)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(token = token.fingerprint(), error = %e, "Failed to store binding context in Redis");
                map_redis_error("failed to write value to Redis", e)
            })?;

        match reply {
            Some(_) => {
                debug!(token = token.fingerprint(), ttl_ms, "Stored binding context in Redis");
                Ok(true)
            }
            None => {
                debug!(token = token.fingerprint(), "Key already occupied in Redis");
                Ok(false)
            }
        }
    }

    async fn fetch_and_remove(&self, token: &AccessToken) -> Result<Option<BindingContext>> {
        let key = self.store_key(token);
        trace!(token = token.fingerprint(), strategy = ?self.strategy, "Taking binding context from Redis");

        let raw = self.take_raw(&key).await.map_err(|e| {
            warn!(token = token.fingerprint(), error = %e, "Redis error on fetch-and-remove");
            map_redis_error("failed to take value from Redis", e)
        })?;

        let Some(raw) = raw else {
            trace!(token = token.fingerprint(), "No entry in Redis");
            return Ok(None);
        };

        debug!(token = token.fingerprint(), "Took binding context from Redis");
        serde_json::from_str::<BindingContext>(&raw)
            .map(Some)
            .map_err(|e| {
                warn!(token = token.fingerprint(), error = %e, "Failed to deserialize binding context");
                StoreError::InvalidData(format!(
                    "invalid value for token {}: {e}",
                    token.fingerprint()
                ))
            })
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping Redis", e))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Operation(format!("unexpected PING reply: {pong}")))
        }
    }
}
