use crate::error::CatalogError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Identifier of a protected resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A protected resource and the location a redeemed link redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub target_location: String,
}

/// A read-only view of the resource catalog.
///
/// This is all the link service needs: an existence check at issuance and
/// a fresh target lookup at redemption.
#[async_trait]
pub trait ResourceLookup: Send + Sync + 'static {
    /// Retrieves a resource by id.
    /// Returns `None` if it does not exist.
    async fn get(&self, id: ResourceId) -> Result<Option<Resource>>;
}

#[async_trait]
pub trait ResourceCatalog: ResourceLookup {
    /// Lists resources ordered by id, optionally keeping only those whose
    /// name contains `name_filter` (case-insensitive).
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Resource>>;

    /// Inserts a resource. Returns `Err(Conflict)` if the id is taken.
    async fn insert(&self, resource: Resource) -> Result<()>;

    /// Deletes a resource.
    /// Returns `true` if it existed and was removed.
    async fn delete(&self, id: ResourceId) -> Result<bool>;
}

#[async_trait]
impl<T: ResourceLookup + ?Sized> ResourceLookup for std::sync::Arc<T> {
    async fn get(&self, id: ResourceId) -> Result<Option<Resource>> {
        (**self).get(id).await
    }
}

#[async_trait]
impl<T: ResourceCatalog + ?Sized> ResourceCatalog for std::sync::Arc<T> {
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Resource>> {
        (**self).list(name_filter).await
    }

    async fn insert(&self, resource: Resource) -> Result<()> {
        (**self).insert(resource).await
    }

    async fn delete(&self, id: ResourceId) -> Result<bool> {
        (**self).delete(id).await
    }
}
