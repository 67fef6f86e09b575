use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    get_product_handler, health_handler, issue_link_handler, list_products_handler,
    redeem_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/products", get(list_products_handler))
            .route("/products/{product_id}", get(get_product_handler))
            .route("/products/{product_id}/access-link", get(issue_link_handler))
            .route("/auth/access", get(redeem_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
