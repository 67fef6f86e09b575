use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use onepass_core::resource::Result;
use onepass_core::{CatalogError, Resource, ResourceCatalog, ResourceId, ResourceLookup};
use tracing::debug;

/// In-memory resource catalog backed by DashMap.
///
/// Sharded locks keep lookups on the redemption path from contending with
/// each other or with catalog edits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    resources: DashMap<ResourceId, Resource>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with `resources`. Later entries win
    /// over earlier ones with the same id.
    pub fn with_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let catalog = Self::new();
        for resource in resources {
            catalog.resources.insert(resource.id, resource);
        }
        catalog
    }

    /// Number of resources held.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn matches_name(resource: &Resource, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => resource.name.to_lowercase().contains(needle),
    }
}

#[async_trait]
impl ResourceLookup for InMemoryCatalog {
    async fn get(&self, id: ResourceId) -> Result<Option<Resource>> {
        Ok(self.resources.get(&id).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl ResourceCatalog for InMemoryCatalog {
    async fn list(&self, name_filter: Option<&str>) -> Result<Vec<Resource>> {
        let needle = name_filter.map(str::to_lowercase);
        let mut found: Vec<Resource> = self
            .resources
            .iter()
            .filter(|entry| matches_name(entry.value(), needle.as_deref()))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by_key(|resource| resource.id);
        Ok(found)
    }

    async fn insert(&self, resource: Resource) -> Result<()> {
        match self.resources.entry(resource.id) {
            Entry::Occupied(_) => Err(CatalogError::Conflict(resource.id.to_string())),
            Entry::Vacant(slot) => {
                debug!(resource_id = %resource.id, "Inserted resource");
                slot.insert(resource);
                Ok(())
            }
        }
    }

    async fn delete(&self, id: ResourceId) -> Result<bool> {
        Ok(self.resources.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: i64, name: &str) -> Resource {
        Resource {
            id: ResourceId(id),
            name: name.to_string(),
            target_location: format!("/files/{id}.pdf"),
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(resource(7, "Report")).await.unwrap();

        let got = catalog.get(ResourceId(7)).await.unwrap().unwrap();
        assert_eq!(got.target_location, "/files/7.pdf");
        assert!(catalog.get(ResourceId(8)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_taken_id() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(resource(1, "First")).await.unwrap();

        let err = catalog.insert(resource(1, "Second")).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
        assert_eq!(catalog.get(ResourceId(1)).await.unwrap().unwrap().name, "First");
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let catalog =
            InMemoryCatalog::with_resources([resource(3, "c"), resource(1, "a"), resource(2, "b")]);

        let ids: Vec<i64> = catalog
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_filters_case_insensitively() {
        let catalog = InMemoryCatalog::with_resources([
            resource(1, "Annual Report"),
            resource(2, "Price List"),
            resource(3, "quarterly report"),
        ]);

        let names: Vec<String> = catalog
            .list(Some("REPORT"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Annual Report", "quarterly report"]);

        assert!(catalog.list(Some("missing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let catalog = InMemoryCatalog::with_resources([resource(7, "Report")]);

        assert!(catalog.delete(ResourceId(7)).await.unwrap());
        assert!(!catalog.delete(ResourceId(7)).await.unwrap());
        assert!(catalog.is_empty());
    }
}
