//! Issuance and single-use redemption of access links.
//!
//! [`LinkService`] mints a token bound to a resource and to the issuing
//! request's [`ClientSignals`](onepass_core::ClientSignals), parks the
//! binding in a [`TokenStore`](onepass_core::TokenStore) with a fixed TTL,
//! and later burns it on the first redemption attempt, whatever the outcome.

pub mod error;
pub mod generator;
pub mod service;
pub mod settings;

pub use error::LinkError;
pub use generator::{RandomTokenGenerator, TokenGenerator};
pub use service::{AccessLinks, IssuedLink, LinkService};
pub use settings::LinkSettings;
