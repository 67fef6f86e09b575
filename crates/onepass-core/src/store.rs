use crate::context::BindingContext;
use crate::error::StoreError;
use crate::token::AccessToken;
use async_trait::async_trait;
use std::time::Duration;

/// Result type for token store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// An ephemeral key-value store holding one [`BindingContext`] per token.
///
/// Expiry is the store's job: once `ttl` has elapsed an entry must read as
/// absent, whether or not it has been physically evicted.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Stores `context` under `token` for `ttl`, only if the key is free.
    ///
    /// Returns `false` when a live entry already holds the key; that entry
    /// is left untouched.
    async fn set_with_expiry(
        &self,
        token: &AccessToken,
        context: &BindingContext,
        ttl: Duration,
    ) -> Result<bool>;

    /// Reads and deletes the entry for `token` in one indivisible step.
    ///
    /// Among concurrent callers presenting the same token, at most one
    /// observes `Some`.
    async fn fetch_and_remove(&self, token: &AccessToken) -> Result<Option<BindingContext>>;

    /// Connectivity probe.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    async fn set_with_expiry(
        &self,
        token: &AccessToken,
        context: &BindingContext,
        ttl: Duration,
    ) -> Result<bool> {
        (**self).set_with_expiry(token, context, ttl).await
    }

    async fn fetch_and_remove(&self, token: &AccessToken) -> Result<Option<BindingContext>> {
        (**self).fetch_and_remove(token).await
    }

    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }
}
