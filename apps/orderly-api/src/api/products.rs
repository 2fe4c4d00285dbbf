use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use orderly_core::Product;
use serde::{Deserialize, Serialize};

use super::{ListQuery, MessageResponse};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// Body of `POST /products/` and `PUT /products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        ProductResponse {
            id: product.id,
            price: product.price().to_decimal(),
            name: product.name,
            description: product.description,
        }
    }
}

pub async fn create_product(
    State(state): State<AppState>,
    _user: AuthUser,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let Json(payload) = payload?;

    let product = state
        .orders
        .create_product(&payload.name, payload.description.as_deref(), payload.price)
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let Query(query) = query?;
    let products = state.orders.read_products(query.skip, query.limit).await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

pub async fn read_product(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProductResponse>> {
    let Path(id) = id?;
    let product = state.orders.read_product(id).await?;
    Ok(Json(product.into()))
}

pub async fn update_product(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<Json<ProductResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;

    let product = state
        .orders
        .update_product(id, &payload.name, payload.description.as_deref(), payload.price)
        .await?;

    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    let message = state.orders.delete_product(id).await?;
    Ok(Json(MessageResponse::new(message)))
}
