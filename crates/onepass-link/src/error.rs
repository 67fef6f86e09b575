use onepass_core::{CatalogError, MismatchReason, ResourceId, StoreError};
use thiserror::Error;

/// Failures of link issuance and redemption.
///
/// None of these are retried internally. Only the infrastructure kinds are
/// worth a fresh call, and that choice belongs to the caller.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("resource {0} not found")]
    ResourceNotFound(ResourceId),

    /// Absent, expired, already consumed and malformed tokens all land
    /// here, so a prober cannot tell them apart.
    #[error("link expired or already used")]
    LinkExpiredOrUsed,

    #[error("client mismatch: {0}")]
    ClientMismatch(MismatchReason),

    #[error("missing client signal: {0}")]
    MissingClientSignal(&'static str),

    #[error("token store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("resource lookup failed: {0}")]
    Lookup(#[from] CatalogError),

    #[error("freshly generated token already present in store")]
    TokenCollision,
}

impl LinkError {
    /// Whether the failure came from infrastructure and a fresh call might
    /// succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LinkError::StoreUnavailable(e) => e.is_transient(),
            LinkError::Lookup(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_infrastructure_failures_are_transient() {
        assert!(LinkError::StoreUnavailable(StoreError::Timeout("slow".into())).is_transient());
        assert!(LinkError::Lookup(CatalogError::Unavailable("down".into())).is_transient());
        assert!(!LinkError::StoreUnavailable(StoreError::InvalidData("bad".into())).is_transient());
        assert!(!LinkError::LinkExpiredOrUsed.is_transient());
        assert!(!LinkError::ClientMismatch(MismatchReason::UserAgent).is_transient());
        assert!(!LinkError::TokenCollision.is_transient());
    }
}
