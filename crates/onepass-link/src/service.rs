use crate::error::LinkError;
use crate::generator::{RandomTokenGenerator, TokenGenerator};
use crate::settings::LinkSettings;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use onepass_core::{
    AccessToken, BindingContext, ClientSignals, ResourceId, ResourceLookup, TokenStore,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// A freshly issued access link.
#[derive(Debug, Clone)]
pub struct IssuedLink {
    pub token: AccessToken,
    pub verify_url: String,
    /// Instant after which redemption fails.
    pub expires_at: Timestamp,
}

/// Issuance and redemption of single-use access links.
#[async_trait]
pub trait AccessLinks: Send + Sync + 'static {
    /// Mints a link for `resource_id`, bound to the issuing request.
    ///
    /// Fails with [`LinkError::ResourceNotFound`] without touching the
    /// store when the resource does not exist.
    async fn issue_link(
        &self,
        resource_id: ResourceId,
        signals: &ClientSignals,
    ) -> Result<IssuedLink, LinkError>;

    /// Burns `token` and returns the target location of its resource.
    ///
    /// The token is consumed before any binding check runs, so every
    /// attempt after the first fails with [`LinkError::LinkExpiredOrUsed`],
    /// including attempts following a mismatch.
    async fn redeem(&self, token: &str, signals: &ClientSignals) -> Result<String, LinkError>;

    /// Probes the token store.
    async fn ping_store(&self) -> Result<(), LinkError>;
}

/// The link issuer and redeemer.
///
/// The store and the resource lookup are injected at construction; the
/// service holds no other shared state.
#[derive(Debug)]
pub struct LinkService<S, L, G = RandomTokenGenerator> {
    store: Arc<S>,
    lookup: Arc<L>,
    generator: Arc<G>,
    settings: LinkSettings,
}

impl<S, L, G> Clone for LinkService<S, L, G> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lookup: Arc::clone(&self.lookup),
            generator: Arc::clone(&self.generator),
            settings: self.settings.clone(),
        }
    }
}

impl<S: TokenStore, L: ResourceLookup> LinkService<S, L> {
    /// Creates a service drawing tokens from the system CSPRNG.
    pub fn new(store: S, lookup: L, settings: LinkSettings) -> Self {
        Self::with_generator(store, lookup, RandomTokenGenerator, settings)
    }
}

impl<S: TokenStore, L: ResourceLookup, G: TokenGenerator> LinkService<S, L, G> {
    /// Creates a service with a custom token generator.
    pub fn with_generator(store: S, lookup: L, generator: G, settings: LinkSettings) -> Self {
        Self {
            store: Arc::new(store),
            lookup: Arc::new(lookup),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    fn expiry_from_now(&self) -> Timestamp {
        SignedDuration::try_from(self.settings.ttl)
            .ok()
            .and_then(|ttl| Timestamp::now().checked_add(ttl).ok())
            .unwrap_or(Timestamp::MAX)
    }
}

fn require_signals(signals: &ClientSignals) -> Result<(), LinkError> {
    if signals.user_agent.is_empty() {
        return Err(LinkError::MissingClientSignal("user-agent"));
    }
    if signals.client_address.is_empty() {
        return Err(LinkError::MissingClientSignal("client address"));
    }
    Ok(())
}

#[async_trait]
impl<S: TokenStore, L: ResourceLookup, G: TokenGenerator> AccessLinks for LinkService<S, L, G> {
    async fn issue_link(
        &self,
        resource_id: ResourceId,
        signals: &ClientSignals,
    ) -> Result<IssuedLink, LinkError> {
        require_signals(signals)?;

        if self.lookup.get(resource_id).await?.is_none() {
            debug!(%resource_id, "Refusing to issue link for unknown resource");
            return Err(LinkError::ResourceNotFound(resource_id));
        }

        let token = self.generator.generate();
        let context = BindingContext::bind(resource_id, signals);
        let expires_at = self.expiry_from_now();

        let stored = self
            .store
            .set_with_expiry(&token, &context, self.settings.ttl)
            .await
            .map_err(|e| {
                warn!(%resource_id, error = %e, "Failed to store binding context");
                LinkError::StoreUnavailable(e)
            })?;

        if !stored {
            error!(%resource_id, token = token.fingerprint(), "Generated token collided with a live key");
            return Err(LinkError::TokenCollision);
        }

        info!(%resource_id, token = token.fingerprint(), %expires_at, "Issued access link");

        Ok(IssuedLink {
            verify_url: self.settings.verify_url(token.as_str()),
            token,
            expires_at,
        })
    }

    async fn redeem(&self, token: &str, signals: &ClientSignals) -> Result<String, LinkError> {
        require_signals(signals)?;

        // A malformed token can never have been issued.
        let Some(token) = AccessToken::parse(token) else {
            debug!("Rejected malformed token");
            return Err(LinkError::LinkExpiredOrUsed);
        };

        let context = self
            .store
            .fetch_and_remove(&token)
            .await
            .map_err(|e| {
                warn!(token = token.fingerprint(), error = %e, "Failed to take binding context");
                LinkError::StoreUnavailable(e)
            })?
            .ok_or_else(|| {
                info!(token = token.fingerprint(), "Link expired or already used");
                LinkError::LinkExpiredOrUsed
            })?;

        // The token is burned from here on, whatever happens next.
        context.verify(signals).map_err(|reason| {
            warn!(
                token = token.fingerprint(),
                resource_id = %context.resource_id,
                %reason,
                "Binding check failed"
            );
            LinkError::ClientMismatch(reason)
        })?;

        let resource = self
            .lookup
            .get(context.resource_id)
            .await?
            .ok_or_else(|| {
                info!(resource_id = %context.resource_id, "Resource vanished before redemption");
                LinkError::ResourceNotFound(context.resource_id)
            })?;

        info!(token = token.fingerprint(), resource_id = %resource.id, "Redeemed access link");
        Ok(resource.target_location)
    }

    async fn ping_store(&self) -> Result<(), LinkError> {
        Ok(self.store.ping().await?)
    }
}
