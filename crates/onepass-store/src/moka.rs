use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use moka::future::Cache;
use moka::Expiry;
use onepass_core::{AccessToken, BindingContext, StoreError, TokenStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

const DEFAULT_CAPACITY: u64 = 100_000;

/// A stored context together with the TTL it was written with.
#[derive(Debug, Clone)]
struct Entry {
    context: BindingContext,
    ttl: Duration,
    expire_at: Timestamp,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Timestamp::now() >= self.expire_at
    }
}

/// Per-entry expiry: each entry lives exactly as long as the TTL it was
/// written with.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory token store using Moka.
///
/// Suitable for single-node deployments and tests. Insertion goes through
/// Moka's entry API so set-if-absent is atomic, and [`Cache::remove`] hands
/// the value to exactly one caller, which gives the single-use guarantee.
///
/// Moka evicts lazily, so every entry also carries its absolute deadline;
/// an entry removed after that instant is reported as absent.
///
/// The cache itself is unbounded so a live token is never evicted early.
/// The store counts live entries instead and refuses new ones with
/// [`StoreError::Unavailable`] once the limit is reached.
#[derive(Clone)]
pub struct MokaTokenStore {
    cache: Cache<String, Entry>,
    live: Arc<AtomicU64>,
    max_live: u64,
}

impl std::fmt::Debug for MokaTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaTokenStore")
            .field("live", &self.live.load(Ordering::Acquire))
            .field("max_live", &self.max_live)
            .finish()
    }
}

impl MokaTokenStore {
    /// Creates a store holding at most 100,000 live tokens.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a store with a custom maximum number of live tokens.
    pub fn with_capacity(max_live: u64) -> Self {
        let live = Arc::new(AtomicU64::new(0));
        let released = Arc::clone(&live);
        // Fires once per stored entry, whether taken or expired.
        let cache = Cache::builder()
            .expire_after(EntryExpiry)
            .eviction_listener(move |_key, _value, _cause| {
                released.fetch_sub(1, Ordering::AcqRel);
            })
            .build();
        Self {
            cache,
            live,
            max_live,
        }
    }

    fn try_reserve(&self) -> bool {
        let previous = self.live.fetch_add(1, Ordering::AcqRel);
        if previous >= self.max_live {
            self.live.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    fn release(&self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }

    /// Claims room for one more live token.
    async fn reserve_slot(&self, token: &AccessToken) -> Result<()> {
        if self.try_reserve() {
            return Ok(());
        }
        // Expired entries are only released by Moka's housekeeping.
        self.cache.run_pending_tasks().await;
        if self.try_reserve() {
            return Ok(());
        }
        warn!(token = token.fingerprint(), max_live = self.max_live, "In-memory token store is full");
        Err(StoreError::Unavailable(format!(
            "in-memory token store is full ({} live tokens)",
            self.max_live
        )))
    }

    /// Returns a builder for a custom store configuration.
    pub fn builder() -> StoreConfigBuilder {
        StoreConfig::builder()
    }
}

impl Default for MokaTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MokaTokenStore {
    async fn set_with_expiry(
        &self,
        token: &AccessToken,
        context: &BindingContext,
        ttl: Duration,
    ) -> Result<bool> {
        trace!(token = token.fingerprint(), "Storing binding context in Moka");

        let signed = SignedDuration::try_from(ttl)
            .map_err(|e| StoreError::Operation(format!("invalid ttl {ttl:?}: {e}")))?;
        let expire_at = Timestamp::now()
            .checked_add(signed)
            .map_err(|e| StoreError::Operation(format!("invalid ttl {ttl:?}: {e}")))?;

        let entry = Entry {
            context: context.clone(),
            ttl,
            expire_at,
        };

        self.reserve_slot(token).await?;

        let stored = self
            .cache
            .entry(token.as_str().to_string())
            .or_insert_with(async move { entry })
            .await;

        if stored.is_fresh() {
            debug!(token = token.fingerprint(), ttl_ms = ttl.as_millis() as u64, "Stored binding context in Moka");
            Ok(true)
        } else {
            self.release();
            debug!(token = token.fingerprint(), "Key already occupied in Moka");
            Ok(false)
        }
    }

    async fn fetch_and_remove(&self, token: &AccessToken) -> Result<Option<BindingContext>> {
        trace!(token = token.fingerprint(), "Taking binding context from Moka");

        match self.cache.remove(token.as_str()).await {
            Some(entry) if entry.is_expired() => {
                debug!(token = token.fingerprint(), "Removed expired entry from Moka");
                Ok(None)
            }
            Some(entry) => {
                debug!(token = token.fingerprint(), "Took binding context from Moka");
                Ok(Some(entry.context))
            }
            None => {
                trace!(token = token.fingerprint(), "No entry in Moka");
                Ok(None)
            }
        }
    }
}

/// Configuration for creating a [`MokaTokenStore`] with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct StoreConfig {
    /// Maximum number of live tokens held at once.
    #[builder(default = DEFAULT_CAPACITY)]
    max_capacity: u64,
}

impl From<StoreConfig> for MokaTokenStore {
    fn from(config: StoreConfig) -> Self {
        MokaTokenStore::with_capacity(config.max_capacity)
    }
}
