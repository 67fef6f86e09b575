use std::time::Duration;
use typed_builder::TypedBuilder;

/// Lifetime of an issued link.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Path of the redemption endpoint.
pub const DEFAULT_VERIFY_PATH: &str = "/auth/access";

/// Issuance settings for a [`LinkService`](crate::LinkService).
///
/// # Example
///
/// ```rust
/// use onepass_link::LinkSettings;
/// use std::time::Duration;
///
/// let settings = LinkSettings::builder()
///     .ttl(Duration::from_secs(30))
///     .public_base_url(Some("https://files.example.com".to_string()))
///     .build();
///
/// assert_eq!(
///     settings.verify_url("abc"),
///     "https://files.example.com/auth/access?token=abc"
/// );
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct LinkSettings {
    /// How long a link stays redeemable. Fixed at issuance, never renewed.
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,

    #[builder(default = DEFAULT_VERIFY_PATH.to_string(), setter(into))]
    pub verify_path: String,

    /// When set, `verify_url` is absolute; otherwise it is a relative path.
    #[builder(default)]
    pub public_base_url: Option<String>,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LinkSettings {
    /// Builds the redemption URL for a token. Tokens use the URL-safe
    /// alphabet, so no escaping is needed.
    pub fn verify_url(&self, token: &str) -> String {
        let base = self
            .public_base_url
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .unwrap_or_default();
        format!("{base}{}?token={token}", self.verify_path)
    }
}
