use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use platter_core::models::{GlobalDish, Order, OrderItem, Restaurant, RestaurantMenuItem, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Display name
    pub name: String,
    /// Email address; unique across the platform
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    /// Phone number; unique across the platform
    pub phone_number: String,
    /// Delivery address
    pub address: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique identifier for the user
    pub id: i32,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone_number: String,
    /// Delivery address
    pub address: String,
    /// Role: USER, RESTAURANT_ADMIN or ADMIN
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            address: user.address,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    /// New plaintext password, hashed before storage
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueTokenRequest {
    /// Grant type (must be "password")
    pub grant_type: String,
    /// Email used at registration
    pub username: String,
    /// Password for authentication
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Token type (e.g., "bearer")
    pub token_type: String,
    /// Access token
    pub access_token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDishRequest {
    /// Catalog-unique dish name (case-insensitive)
    pub name: String,
    pub description: Option<String>,
    /// e.g. Starters, Indian, Chinese
    pub category: String,
    #[serde(default = "default_true")]
    pub is_veg: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DishResponse {
    /// Unique identifier for the dish
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub is_veg: bool,
}

impl From<GlobalDish> for DishResponse {
    fn from(dish: GlobalDish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            category: dish.category,
            is_veg: dish.is_veg,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRestaurantRequest {
    /// Platform-unique restaurant name
    pub name: String,
    pub address: String,
    pub city: String,
    /// User who administers this restaurant
    pub owner_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantResponse {
    /// Unique identifier for the restaurant
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub rating: f64,
    pub is_open: bool,
}

impl From<Restaurant> for RestaurantResponse {
    fn from(restaurant: Restaurant) -> Self {
        Self {
            id: restaurant.id,
            name: restaurant.name,
            address: restaurant.address,
            city: restaurant.city,
            rating: restaurant.rating,
            is_open: restaurant.is_open,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemResponse {
    /// Unique identifier for the menu listing
    pub id: i32,
    /// Restaurant-specific price (as string)
    pub price: String,
    pub is_available: bool,
    /// The catalog dish this listing prices
    pub dish: DishResponse,
}

impl From<(RestaurantMenuItem, GlobalDish)> for MenuItemResponse {
    fn from((item, dish): (RestaurantMenuItem, GlobalDish)) -> Self {
        Self {
            id: item.id,
            price: item.price.to_string(),
            is_available: item.is_available,
            dish: dish.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestaurantWithMenuResponse {
    #[serde(flatten)]
    pub restaurant: RestaurantResponse,
    pub menu_items: Vec<MenuItemResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMenuItemRequest {
    /// Catalog dish name, matched case-insensitively
    pub dish_name: String,
    /// Restaurant-specific price (as string)
    pub price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    /// New price (as string)
    pub price: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub menu_item_id: i32,
    /// Must be at least 1
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub restaurant_id: i32,
    pub delivery_address: String,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub menu_item_id: i32,
    pub quantity: i32,
    /// Per-unit price frozen at placement time (as string)
    pub price_at_order: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    /// Unique identifier for the order
    pub id: i32,
    pub user_id: i32,
    pub restaurant_id: i32,
    /// Sum of price_at_order x quantity over all items (as string)
    pub total_amount: String,
    /// PLACED, CONFIRMED, PREPARING, OUT_FOR_DELIVERY, DELIVERED or CANCELLED
    pub status: String,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<(Order, Vec<OrderItem>)> for OrderResponse {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            total_amount: order.total_amount.to_string(),
            status: order.status.to_string(),
            delivery_address: order.delivery_address,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|i| OrderItemResponse {
                    menu_item_id: i.menu_item_id,
                    quantity: i.quantity,
                    price_at_order: i.price_at_order.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Target status wire name, e.g. "CONFIRMED"
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Error message
    pub error: String,
}
