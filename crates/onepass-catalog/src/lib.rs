//! Resource catalog backends.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryCatalog;
pub use mysql::MySqlCatalog;
pub use onepass_core::{CatalogError, Resource, ResourceCatalog, ResourceId, ResourceLookup};
