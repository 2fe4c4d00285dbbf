use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use orderly_core::{Order, OrderDetail, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ListQuery, MessageResponse};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

/// Body of `POST /orders/` and `PUT /orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayload {
    pub customer_name: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: OrderStatus,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            total_amount: order.total_amount().to_decimal(),
            customer_name: order.customer_name,
            status: order.status,
        }
    }
}

/// Body of `POST /orders/{id}/details/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderDetailPayload {
    pub product_id: i64,
    pub quantity: i64,
}

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    let Json(payload) = payload?;
    debug!(user = %user.username, "Create order");

    let order = state
        .orders
        .create_order(&payload.customer_name, payload.total_amount)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<OrderResponse>>> {
    let Query(query) = query?;

    let orders = state.orders.read_orders(query.skip, query.limit).await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

pub async fn read_order(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let Path(id) = id?;
    let order = state.orders.read_order(id).await?;
    Ok(Json(order.into()))
}

pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    debug!(user = %user.username, order_id = id, "Update order");

    let order = state
        .orders
        .update_order(id, &payload.customer_name, payload.total_amount)
        .await?;

    Ok(Json(order.into()))
}

pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Path(id) = id?;
    debug!(user = %user.username, order_id = id, "Delete order");

    let message = state.orders.delete_order(id).await?;
    Ok(Json(MessageResponse::new(message)))
}

pub async fn create_order_detail(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderDetailPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    let Path(order_id) = id?;
    let Json(payload) = payload?;
    debug!(user = %user.username, order_id, "Add order line");

    let detail = state
        .orders
        .create_order_detail(order_id, payload.product_id, payload.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn list_order_details(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<OrderDetail>>> {
    let Path(order_id) = id?;
    let details = state.orders.read_order_details(order_id).await?;
    Ok(Json(details))
}
