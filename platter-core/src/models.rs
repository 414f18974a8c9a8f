use std::fmt;
use std::io::Write;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    deserialize::{self, FromSql, FromSqlRow},
    expression::AsExpression,
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
};
use serde::{Deserialize, Serialize};

use crate::schema::{global_dishes, order_items, orders, restaurant_menu_items, restaurants, users};

#[derive(FromSqlRow, AsExpression, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::UserRole)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    RestaurantAdmin,
    Admin,
}

impl ToSql<crate::schema::sql_types::UserRole, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            UserRole::User => out.write_all(b"USER")?,
            UserRole::RestaurantAdmin => out.write_all(b"RESTAURANT_ADMIN")?,
            UserRole::Admin => out.write_all(b"ADMIN")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::UserRole, Pg> for UserRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"USER" => Ok(UserRole::User),
            b"RESTAURANT_ADMIN" => Ok(UserRole::RestaurantAdmin),
            b"ADMIN" => Ok(UserRole::Admin),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UserRole::User => "USER",
            UserRole::RestaurantAdmin => "RESTAURANT_ADMIN",
            UserRole::Admin => "ADMIN",
        })
    }
}

#[derive(FromSqlRow, AsExpression, Serialize, Deserialize, PartialEq, Eq, Copy, Clone, Debug)]
#[diesel(sql_type = crate::schema::sql_types::OrderStatus)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Forward-only lifecycle. DELIVERED and CANCELLED are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Placed, Confirmed)
                | (Placed, Cancelled)
                | (Confirmed, Preparing)
                | (Confirmed, Cancelled)
                | (Preparing, OutForDelivery)
                | (Preparing, Cancelled)
                | (OutForDelivery, Delivered)
        )
    }
}

impl ToSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            OrderStatus::Placed => out.write_all(b"PLACED")?,
            OrderStatus::Confirmed => out.write_all(b"CONFIRMED")?,
            OrderStatus::Preparing => out.write_all(b"PREPARING")?,
            OrderStatus::OutForDelivery => out.write_all(b"OUT_FOR_DELIVERY")?,
            OrderStatus::Delivered => out.write_all(b"DELIVERED")?,
            OrderStatus::Cancelled => out.write_all(b"CANCELLED")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::schema::sql_types::OrderStatus, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"PLACED" => Ok(OrderStatus::Placed),
            b"CONFIRMED" => Ok(OrderStatus::Confirmed),
            b"PREPARING" => Ok(OrderStatus::Preparing),
            b"OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            b"DELIVERED" => Ok(OrderStatus::Delivered),
            b"CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        })
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(OrderStatus::Placed),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "OUT_FOR_DELIVERY" => Ok(OrderStatus::OutForDelivery),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {other}")),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub phone_number: String,
    pub address: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub phone_number: String,
    pub address: String,
    pub role: UserRole,
}

/// Profile fields a user may change. `None` leaves the column alone.
#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub hashed_password: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = restaurants)]
pub struct Restaurant {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub city: String,
    pub rating: f64,
    pub is_open: bool,
    pub owner_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub city: String,
    pub owner_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Clone, Debug, PartialEq)]
#[diesel(table_name = global_dishes)]
pub struct GlobalDish {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub is_veg: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = global_dishes)]
pub struct NewGlobalDish {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub is_veg: bool,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Restaurant))]
#[diesel(belongs_to(GlobalDish))]
#[diesel(table_name = restaurant_menu_items)]
pub struct RestaurantMenuItem {
    pub id: i32,
    pub restaurant_id: i32,
    pub global_dish_id: i32,
    pub price: BigDecimal,
    pub is_available: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = restaurant_menu_items)]
pub struct NewRestaurantMenuItem {
    pub restaurant_id: i32,
    pub global_dish_id: i32,
    pub price: BigDecimal,
    pub is_available: bool,
}

#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = restaurant_menu_items)]
pub struct MenuItemChanges {
    pub price: Option<BigDecimal>,
    pub is_available: Option<bool>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Restaurant))]
#[diesel(table_name = orders)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub restaurant_id: i32,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub user_id: i32,
    pub restaurant_id: i32,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub delivery_address: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Clone, Debug, PartialEq)]
#[diesel(belongs_to(Order))]
#[diesel(table_name = order_items)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub price_at_order: BigDecimal,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub price_at_order: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_follows_forward_lifecycle() {
        use OrderStatus::*;

        assert!(Placed.can_transition_to(Confirmed));
        assert!(Placed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Preparing.can_transition_to(OutForDelivery));
        assert!(Preparing.can_transition_to(Cancelled));
        assert!(OutForDelivery.can_transition_to(Delivered));
    }

    #[test]
    fn order_status_rejects_backward_and_terminal_transitions() {
        use OrderStatus::*;

        assert!(!Confirmed.can_transition_to(Placed));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Placed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!OutForDelivery.can_transition_to(Cancelled));
        assert!(!Placed.can_transition_to(Delivered));
        assert!(!Placed.can_transition_to(Placed));
    }

    #[test]
    fn order_status_round_trips_through_wire_name() {
        for status in [
            OrderStatus::Placed,
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert!("NOT_A_STATUS".parse::<OrderStatus>().is_err());
    }
}
