use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use onepass_core::CatalogError;
use onepass_link::LinkError;

use crate::model::ErrorBody;

pub type Result<T> = std::result::Result<T, AppError>;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const PRODUCT_GONE: &str = "Product no longer exists";
pub const LINK_EXPIRED_OR_USED: &str = "Link expired or already used";
pub const CLIENT_MISMATCH: &str = "Security error: Use the same browser and network";
pub const MISSING_CLIENT_SIGNAL: &str = "Client identification missing";

/// An error answered to the client.
#[derive(Debug)]
pub enum AppError {
    /// Status and detail are safe to show as-is.
    External(StatusCode, &'static str),
    /// Logged in full, answered with a generic detail.
    Internal(StatusCode, String),
}

impl AppError {
    fn infrastructure(transient: bool, message: String) -> Self {
        let status = if transient {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        AppError::Internal(status, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::External(status, detail) => (status, Json(ErrorBody::new(detail))).into_response(),
            AppError::Internal(status, message) => {
                tracing::error!(%status, error = %message, "request failed");
                let detail = if status == StatusCode::SERVICE_UNAVAILABLE {
                    "Service temporarily unavailable"
                } else {
                    "Internal server error"
                };
                (status, Json(ErrorBody::new(detail))).into_response()
            }
        }
    }
}

impl From<LinkError> for AppError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::ResourceNotFound(_) => AppError::External(StatusCode::NOT_FOUND, PRODUCT_NOT_FOUND),
            LinkError::LinkExpiredOrUsed => {
                AppError::External(StatusCode::BAD_REQUEST, LINK_EXPIRED_OR_USED)
            }
            // Which check failed stays in the logs.
            LinkError::ClientMismatch(_) => AppError::External(StatusCode::FORBIDDEN, CLIENT_MISMATCH),
            LinkError::MissingClientSignal(_) => {
                AppError::External(StatusCode::BAD_REQUEST, MISSING_CLIENT_SIGNAL)
            }
            LinkError::StoreUnavailable(_) | LinkError::Lookup(_) => {
                AppError::infrastructure(err.is_transient(), err.to_string())
            }
            LinkError::TokenCollision => {
                AppError::Internal(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::infrastructure(err.is_transient(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use onepass_core::{MismatchReason, ResourceId, StoreError};

    async fn detail(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["detail"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn link_errors_map_to_statuses() {
        let cases = [
            (LinkError::ResourceNotFound(ResourceId(1)), StatusCode::NOT_FOUND),
            (LinkError::LinkExpiredOrUsed, StatusCode::BAD_REQUEST),
            (
                LinkError::ClientMismatch(MismatchReason::UserAgent),
                StatusCode::FORBIDDEN,
            ),
            (
                LinkError::MissingClientSignal("user-agent"),
                StatusCode::BAD_REQUEST,
            ),
            (
                LinkError::StoreUnavailable(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LinkError::StoreUnavailable(StoreError::InvalidData("garbage".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (LinkError::TokenCollision, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn mismatch_reasons_share_one_message() {
        for reason in [MismatchReason::UserAgent, MismatchReason::ClientAddress] {
            let response = AppError::from(LinkError::ClientMismatch(reason)).into_response();
            assert_eq!(detail(response).await, CLIENT_MISMATCH);
        }
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let err = LinkError::StoreUnavailable(StoreError::Unavailable(
            "redis://:hunter2@cache:6379 refused".into(),
        ));
        let response = AppError::from(err).into_response();

        let body = detail(response).await;
        assert_eq!(body, "Service temporarily unavailable");
        assert!(!body.contains("hunter2"));
    }
}
