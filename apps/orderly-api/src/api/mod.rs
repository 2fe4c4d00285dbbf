//! HTTP surface.
//!
//! Every route except `/token` and `/health` requires a bearer token; the
//! [`AuthUser`](crate::auth::AuthUser) extractor in each handler enforces it.
//! Collection paths answer with and without the trailing slash.

mod health;
mod orders;
mod products;
mod token;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use orders::{OrderDetailPayload, OrderPayload, OrderResponse};
pub use products::{ProductPayload, ProductResponse};
pub use token::TokenRequest;

pub fn router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/token", post(token::issue_token))
        .route("/health", get(health::health))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/{id}",
            get(orders::read_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/orders/{id}/details",
            get(orders::list_order_details).post(orders::create_order_detail),
        )
        .route(
            "/orders/{id}/details/",
            get(orders::list_order_details).post(orders::create_order_detail),
        )
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/", get(products::list_products).post(products::create_product))
        .route(
            "/products/{id}",
            get(products::read_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `?skip=&limit=` on listing endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    orderly_core::DEFAULT_PAGE_LIMIT
}

/// Body of a successful delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}
