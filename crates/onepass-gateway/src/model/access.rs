use jiff::Timestamp;
use onepass_link::IssuedLink;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AccessLinkResponse {
    pub token: String,
    pub verify_url: String,
    pub expires_at: Timestamp,
}

impl From<IssuedLink> for AccessLinkResponse {
    fn from(link: IssuedLink) -> Self {
        Self {
            token: link.token.to_string(),
            verify_url: link.verify_url,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RedeemQuery {
    #[serde(default)]
    pub token: String,
}
