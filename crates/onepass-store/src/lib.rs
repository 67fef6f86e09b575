//! Ephemeral token store adapters.
//!
//! Every adapter implements [`TokenStore`](onepass_core::TokenStore) with a
//! genuinely atomic fetch-and-remove:
//!
//! - [`MokaTokenStore`]: in-process, per-entry TTL, for single-node
//!   deployments and tests.
//! - [`RedisTokenStore`]: shared across nodes, `SET NX PX` on write and
//!   `GETDEL` (or an equivalent server-side script) on read.
//! - [`TimeoutStore`]: bounds every call of an inner store.

pub mod moka;
pub mod redis;
pub mod timeout;

pub use self::moka::{MokaTokenStore, StoreConfig};
pub use self::redis::{FetchStrategy, RedisTokenStore, DEFAULT_KEY_PREFIX};
pub use self::timeout::TimeoutStore;
