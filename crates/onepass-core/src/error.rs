use thiserror::Error;

/// Errors raised by an ephemeral token store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
    #[error("token store operation timed out: {0}")]
    Timeout(String),
    #[error("token store serialization failed: {0}")]
    Serialization(String),
    #[error("stored binding context is invalid: {0}")]
    InvalidData(String),
    #[error("token store operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    /// Whether a fresh call might succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Timeout(_) | StoreError::Operation(_)
        )
    }
}

/// Errors raised by a resource catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("resource already exists: {0}")]
    Conflict(String),
    #[error("catalog backend unavailable: {0}")]
    Unavailable(String),
    #[error("catalog operation timed out: {0}")]
    Timeout(String),
    #[error("catalog query failed: {0}")]
    Query(String),
    #[error("catalog data is invalid: {0}")]
    InvalidData(String),
    #[error("catalog operation failed: {0}")]
    Operation(String),
}

impl CatalogError {
    /// Whether a fresh call might succeed where this one failed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_) | CatalogError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_transient_kinds() {
        assert!(StoreError::Unavailable("down".into()).is_transient());
        assert!(StoreError::Timeout("slow".into()).is_transient());
        assert!(!StoreError::InvalidData("garbage".into()).is_transient());
        assert!(!StoreError::Serialization("bad".into()).is_transient());
    }

    #[test]
    fn catalog_transient_kinds() {
        assert!(CatalogError::Timeout("slow".into()).is_transient());
        assert!(!CatalogError::Conflict("7".into()).is_transient());
    }
}
