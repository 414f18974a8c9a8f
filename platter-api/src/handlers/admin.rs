use axum::http::{HeaderMap, StatusCode};
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{delete, post},
};
use tracing::instrument;

use platter_core::auth::gate;
use platter_core::catalog;
use platter_core::models::{NewGlobalDish, UserRole};
use platter_core::restaurants::{self, CreateRestaurant};

use crate::error::ApiError;
use crate::models::*;

use super::{AppState, authenticate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/dishes", post(create_dish).get(list_dishes))
        .route("/admin/dishes/{id}", delete(delete_dish))
        .route("/admin/restaurants", post(create_restaurant))
        .route("/admin/restaurants/{id}", delete(delete_restaurant))
}

#[utoipa::path(
    post,
    path = "/admin/dishes",
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish added to the catalog", body = DishResponse),
        (status = 403, description = "Caller is not ADMIN", body = ApiErrorResponse),
        (status = 409, description = "Dish name already taken", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn create_dish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<DishResponse>), ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::Admin])?;

    let conn = &mut state.conn()?;
    let dish = catalog::create_dish(
        conn,
        NewGlobalDish {
            name: payload.name,
            description: payload.description,
            category: payload.category,
            is_veg: payload.is_veg,
        },
    )?;

    Ok((StatusCode::CREATED, Json(dish.into())))
}

#[utoipa::path(
    get,
    path = "/admin/dishes",
    responses(
        (status = 200, description = "All catalog dishes", body = [DishResponse]),
        (status = 403, description = "Caller is not ADMIN", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn list_dishes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<DishResponse>>, ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::Admin])?;

    let conn = &mut state.conn()?;
    let dishes = catalog::list_dishes(conn)?;

    Ok(Json(dishes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/admin/dishes/{id}",
    params(("id" = i32, Path, description = "Dish id")),
    responses(
        (status = 204, description = "Dish removed from the catalog"),
        (status = 404, description = "Dish not found", body = ApiErrorResponse),
        (status = 409, description = "Dish still listed on menus", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn delete_dish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(dish_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::Admin])?;

    let conn = &mut state.conn()?;
    catalog::delete_dish(conn, dish_id)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = RestaurantResponse),
        (status = 403, description = "Caller is not ADMIN", body = ApiErrorResponse),
        (status = 404, description = "Owner user not found", body = ApiErrorResponse),
        (status = 409, description = "Restaurant name already taken", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantResponse>), ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::Admin])?;

    let conn = &mut state.conn()?;
    let restaurant = restaurants::create(
        conn,
        CreateRestaurant {
            name: payload.name,
            address: payload.address,
            city: payload.city,
            owner_id: payload.owner_id,
        },
    )?;

    Ok((StatusCode::CREATED, Json(restaurant.into())))
}

#[utoipa::path(
    delete,
    path = "/admin/restaurants/{id}",
    params(("id" = i32, Path, description = "Restaurant id")),
    responses(
        (status = 204, description = "Restaurant deleted"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 409, description = "Restaurant has order history", body = ApiErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
#[instrument(skip(state, headers))]
pub async fn delete_restaurant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(restaurant_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let principal = authenticate(&state, &headers)?;
    gate::authorize(principal, &[UserRole::Admin])?;

    let conn = &mut state.conn()?;
    restaurants::delete(conn, restaurant_id)?;

    Ok(StatusCode::NO_CONTENT)
}
