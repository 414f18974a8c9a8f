use std::str::FromStr;

use axum::http::{HeaderMap, StatusCode};
use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch, post},
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::instrument;

use platter_core::auth::gate;
use platter_core::models::UserRole;
use platter_core::restaurants::{self, DEFAULT_PAGE_SIZE, MenuItemUpdate};

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/menu", post(add_menu_item))
        .route("/restaurants/menu/{menu_item_id}", patch(update_menu_item))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

fn parse_price(raw: &str) -> Result<BigDecimal, ApiError> {
    BigDecimal::from_str(raw).map_err(|_| ApiError::Invalid(format!("Invalid price: {raw}")))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    params(
        ("offset" = Option<i64>, Query, description = "Rows to skip"),
        ("limit" = Option<i64>, Query, description = "Page size, capped at 100"),
    ),
    responses(
        (status = 200, description = "A page of restaurants", body = [RestaurantResponse]),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RestaurantResponse>>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::User, UserRole::RestaurantAdmin])?;

    let conn = &mut state.conn()?;
    let page = restaurants::list(
        conn,
        params.offset.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;

    Ok(Json(page.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    params(("id" = i32, Path, description = "Restaurant id")),
    responses(
        (status = 200, description = "Restaurant detail with its menu", body = RestaurantWithMenuResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<RestaurantWithMenuResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::User, UserRole::RestaurantAdmin])?;

    let conn = &mut state.conn()?;
    let (restaurant, menu) = restaurants::get_with_menu(conn, restaurant_id)?;

    Ok(Json(RestaurantWithMenuResponse {
        restaurant: restaurant.into(),
        menu_items: menu.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/restaurants/{id}/menu",
    params(("id" = i32, Path, description = "Restaurant id")),
    request_body = AddMenuItemRequest,
    responses(
        (status = 201, description = "Dish listed on the menu", body = MenuItemResponse),
        (status = 403, description = "Caller does not manage this restaurant", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or dish not found", body = ApiErrorResponse),
        (status = 409, description = "Dish is already on this menu", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn add_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<i32>,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItemResponse>), ApiError> {
    let principal = authenticate(&state, &headers)?;
    let principal = gate::authorize(principal, &[UserRole::RestaurantAdmin, UserRole::Admin])?;

    let price = parse_price(&payload.price)?;

    let conn = &mut state.conn()?;
    let item = restaurants::add_menu_item(conn, principal, restaurant_id, &payload.dish_name, price)?;
    let dish = platter_core::catalog::find_dish(conn, item.global_dish_id)?;

    Ok((StatusCode::CREATED, Json((item, dish).into())))
}

#[utoipa::path(
    patch,
    path = "/restaurants/menu/{menu_item_id}",
    params(("menu_item_id" = i32, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Listing updated", body = MenuItemResponse),
        (status = 403, description = "Caller does not manage this restaurant", body = ApiErrorResponse),
        (status = 404, description = "Menu item not found", body = ApiErrorResponse),
        (status = 422, description = "Nothing to update or invalid price", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "restaurants"
)]
#[instrument(skip(state, headers))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(menu_item_id): Path<i32>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    let principal = gate::authorize(principal, &[UserRole::RestaurantAdmin, UserRole::Admin])?;

    let price = payload.price.as_deref().map(parse_price).transpose()?;

    let conn = &mut state.conn()?;
    let item = restaurants::update_menu_item(
        conn,
        principal,
        menu_item_id,
        MenuItemUpdate {
            price,
            is_available: payload.is_available,
        },
    )?;
    let dish = platter_core::catalog::find_dish(conn, item.global_dish_id)?;

    Ok(Json((item, dish).into()))
}
