use crate::error::{AppError, Result, PRODUCT_GONE};
use crate::handlers::client_signals;
use crate::model::{AccessLinkResponse, Envelope, RedeemQuery};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::Json;
use onepass_core::ResourceId;
use onepass_link::LinkError;
use std::net::SocketAddr;

pub async fn issue_link_handler(
    Path(product_id): Path<i64>,
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Envelope<AccessLinkResponse>>> {
    let signals = client_signals(&headers, peer);
    let link = state
        .links()
        .issue_link(ResourceId(product_id), &signals)
        .await?;

    Ok(Json(Envelope::new(
        link.into(),
        "Access link generated successfully",
    )))
}

pub async fn redeem_handler(
    Query(query): Query<RedeemQuery>,
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let signals = client_signals(&headers, peer);
    let target = state
        .links()
        .redeem(&query.token, &signals)
        .await
        .map_err(|err| match err {
            LinkError::ResourceNotFound(_) => AppError::External(StatusCode::NOT_FOUND, PRODUCT_GONE),
            other => other.into(),
        })?;

    Ok(Redirect::temporary(&target))
}
