use axum::http::{HeaderMap, StatusCode};
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
};
use tracing::instrument;

use platter_core::auth::gate;
use platter_core::models::{OrderStatus, UserRole};
use platter_core::orders::{self, OrderLine, PlaceOrder};

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/users/{id}/orders", get(list_user_orders))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 403, description = "Caller is not a customer", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or menu item not found", body = ApiErrorResponse),
        (status = 409, description = "Items from a different restaurant", body = ApiErrorResponse),
        (status = 422, description = "Empty order or bad quantity", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn place_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let principal = authenticate(&state, &headers)?;
    let principal = gate::authorize(principal, &[UserRole::User])?;

    let request = PlaceOrder {
        restaurant_id: payload.restaurant_id,
        delivery_address: payload.delivery_address,
        items: payload
            .items
            .into_iter()
            .map(|i| OrderLine {
                menu_item_id: i.menu_item_id,
                quantity: i.quantity,
            })
            .collect(),
    };

    let conn = &mut state.conn()?;
    let placed = orders::place(conn, principal.id, &request)?;

    Ok((StatusCode::CREATED, Json(placed.into())))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its items", body = OrderResponse),
        (status = 403, description = "Not the order's owner", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let conn = &mut state.conn()?;
    let order = orders::get(conn, principal, order_id)?;

    Ok(Json(order.into()))
}

#[utoipa::path(
    get,
    path = "/users/{id}/orders",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user's orders, newest first", body = [OrderResponse]),
        (status = 403, description = "Not the order history's owner", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn list_user_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let principal = authenticate(&state, &headers)?;

    let conn = &mut state.conn()?;
    let history = orders::list_for_user(conn, principal, user_id)?;

    Ok(Json(history.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order moved to the new status", body = OrderResponse),
        (status = 403, description = "Caller does not manage the restaurant", body = ApiErrorResponse),
        (status = 404, description = "Order not found", body = ApiErrorResponse),
        (status = 422, description = "Illegal status transition", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
#[instrument(skip(state, headers))]
pub async fn update_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    let principal = gate::authorize(principal, &[UserRole::RestaurantAdmin, UserRole::Admin])?;

    let next = payload
        .status
        .parse::<OrderStatus>()
        .map_err(ApiError::Invalid)?;

    let conn = &mut state.conn()?;
    let updated = orders::update_status(conn, principal, order_id, next)?;

    Ok(Json(updated.into()))
}
