//! Core types and traits for the Onepass access-link service.
//!
//! This crate provides the shared vocabulary of the workspace: the opaque
//! [`AccessToken`], the [`BindingContext`] stored under it, the external
//! [`Resource`] it gates, and the seams ([`TokenStore`], [`ResourceLookup`],
//! [`ResourceCatalog`]) that storage adapters implement.

pub mod context;
pub mod error;
pub mod resource;
pub mod store;
pub mod token;

pub use context::{BindingContext, ClientSignals, MismatchReason};
pub use error::{CatalogError, StoreError};
pub use resource::{Resource, ResourceCatalog, ResourceId, ResourceLookup};
pub use store::TokenStore;
pub use token::AccessToken;
