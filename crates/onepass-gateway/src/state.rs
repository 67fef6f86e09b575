use std::sync::Arc;

use onepass_core::ResourceCatalog;
use onepass_link::AccessLinks;

#[derive(Clone)]
pub struct AppState {
    links: Arc<dyn AccessLinks>,
    catalog: Arc<dyn ResourceCatalog>,
}

impl AppState {
    pub fn new(links: Arc<dyn AccessLinks>, catalog: Arc<dyn ResourceCatalog>) -> Self {
        Self { links, catalog }
    }

    pub fn links(&self) -> &dyn AccessLinks {
        self.links.as_ref()
    }

    pub fn catalog(&self) -> &dyn ResourceCatalog {
        self.catalog.as_ref()
    }
}
