mod access;
mod health;
mod products;

pub use access::{issue_link_handler, redeem_handler};
pub use health::health_handler;
pub use products::{get_product_handler, list_products_handler};

use axum::http::{header, HeaderMap};
use onepass_core::ClientSignals;
use std::net::SocketAddr;

/// Identity signals as the transport supplies them. A missing or
/// non-text `User-Agent` becomes an empty string, which the link service
/// rejects.
pub(crate) fn client_signals(headers: &HeaderMap, peer: SocketAddr) -> ClientSignals {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    ClientSignals::new(user_agent, peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn signals_use_header_and_peer_ip() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let signals = client_signals(&headers, "10.0.0.1:54321".parse().unwrap());
        assert_eq!(signals, ClientSignals::new("Mozilla/5.0", "10.0.0.1"));
    }

    #[test]
    fn missing_user_agent_is_empty() {
        let signals = client_signals(&HeaderMap::new(), "[::1]:80".parse().unwrap());
        assert_eq!(signals.user_agent, "");
        assert_eq!(signals.client_address, "::1");
    }
}
