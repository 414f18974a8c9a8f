pub mod admin;
pub mod auth;
pub mod orders;
pub mod restaurants;

// Re-export routers for easier importing
pub use admin::router as admin_router;
pub use auth::router as auth_router;
pub use orders::router as order_router;
pub use restaurants::router as restaurant_router;

use axum::http::HeaderMap;
use utoipa::OpenApi;

use platter_core::DbConn;
use platter_core::DbPool;
use platter_core::auth::gate::{self, Principal};
use platter_core::auth::token::TokenService;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn conn(&self) -> Result<DbConn, ApiError> {
        self.pool
            .get()
            .map_err(|e| ApiError::Internal(format!("Connection pool error: {e}")))
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(ApiError::Unauthorized)?
        .to_str()
        .map_err(|_| ApiError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)
}

/// Shared pipeline stage: every protected handler resolves its bearer
/// token into a Principal here before touching the domain.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = bearer_token(headers)?;
    let conn = &mut state.conn()?;
    gate::authenticate(conn, &state.tokens, token).map_err(ApiError::from)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_user,
        auth::issue_token,
        auth::current_user,
        auth::update_user,
        auth::delete_user,
        admin::create_dish,
        admin::list_dishes,
        admin::delete_dish,
        admin::create_restaurant,
        admin::delete_restaurant,
        restaurants::list_restaurants,
        restaurants::get_restaurant,
        restaurants::add_menu_item,
        restaurants::update_menu_item,
        orders::place_order,
        orders::get_order,
        orders::list_user_orders,
        orders::update_order_status,
    ),
    components(
        schemas(
            crate::models::RegisterUserRequest,
            crate::models::UserResponse,
            crate::models::UpdateUserRequest,
            crate::models::IssueTokenRequest,
            crate::models::IssueTokenResponse,
            crate::models::CreateDishRequest,
            crate::models::DishResponse,
            crate::models::CreateRestaurantRequest,
            crate::models::RestaurantResponse,
            crate::models::RestaurantWithMenuResponse,
            crate::models::MenuItemResponse,
            crate::models::AddMenuItemRequest,
            crate::models::UpdateMenuItemRequest,
            crate::models::OrderItemRequest,
            crate::models::PlaceOrderRequest,
            crate::models::OrderItemResponse,
            crate::models::OrderResponse,
            crate::models::UpdateOrderStatusRequest,
            crate::models::ApiErrorResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration and profile endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "admin", description = "Catalog and restaurant administration"),
        (name = "restaurants", description = "Browsing and menu management"),
        (name = "orders", description = "Order placement and lifecycle")
    ),
    info(
        title = "Platter API",
        description = "Food-ordering platform backend",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::*;
            let password_flow = Password::new("/auth/token", Scopes::default());
            components.add_security_scheme(
                "bearer",
                SecurityScheme::OAuth2(OAuth2::new([Flow::Password(password_flow)])),
            );
        }
    }
}
