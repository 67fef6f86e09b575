//! Call-timeout decorator for token stores.
//!
//! The link service never waits on the store longer than the configured
//! bound: a call that overruns is abandoned and reported as
//! [`StoreError::Timeout`], which callers treat as the store being
//! unavailable.
//!
//! A `fetch_and_remove` that times out may still have consumed the token on
//! the server. The caller sees a failure either way, so the token is never
//! redeemed twice.

use async_trait::async_trait;
use onepass_core::{AccessToken, BindingContext, StoreError, TokenStore};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A store decorator bounding every call of the inner store.
#[derive(Debug, Clone)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: TokenStore> TimeoutStore<S> {
    /// Wraps `inner`, bounding each call by `timeout`.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "Token store call timed out");
                Err(StoreError::Timeout(format!(
                    "{operation} exceeded {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<S: TokenStore> TokenStore for TimeoutStore<S> {
    async fn set_with_expiry(
        &self,
        token: &AccessToken,
        context: &BindingContext,
        ttl: Duration,
    ) -> Result<bool> {
        self.bounded("set_with_expiry", self.inner.set_with_expiry(token, context, ttl))
            .await
    }

    async fn fetch_and_remove(&self, token: &AccessToken) -> Result<Option<BindingContext>> {
        self.bounded("fetch_and_remove", self.inner.fetch_and_remove(token))
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.bounded("ping", self.inner.ping()).await
    }
}
