use crate::error::{AppError, Result, PRODUCT_NOT_FOUND};
use crate::model::{Envelope, ProductQuery, ProductResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use onepass_core::ResourceId;

pub async fn list_products_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Envelope<Vec<ProductResponse>>>> {
    let products: Vec<ProductResponse> = state
        .catalog()
        .list(query.product_name.as_deref())
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(Envelope::new(products, "Products fetched successfully")))
}

pub async fn get_product_handler(
    Path(product_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<ProductResponse>>> {
    let product = state
        .catalog()
        .get(ResourceId(product_id))
        .await?
        .ok_or(AppError::External(StatusCode::NOT_FOUND, PRODUCT_NOT_FOUND))?;

    Ok(Json(Envelope::new(
        product.into(),
        "Product details fetched successfully",
    )))
}
