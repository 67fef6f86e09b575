use onepass_core::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub product_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product_id: i64,
    pub product_name: String,
    pub launch_url: String,
}

impl From<Resource> for ProductResponse {
    fn from(resource: Resource) -> Self {
        Self {
            product_id: resource.id.0,
            product_name: resource.name,
            launch_url: resource.target_location,
        }
    }
}
