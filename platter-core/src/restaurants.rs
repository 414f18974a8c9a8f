use bigdecimal::BigDecimal;
use diesel::prelude::*;

use crate::auth::gate::{self, Principal};
use crate::catalog;
use crate::models::{
    GlobalDish, MenuItemChanges, NewRestaurant, NewRestaurantMenuItem, Restaurant,
    RestaurantMenuItem,
};
use crate::schema::{orders, restaurant_menu_items, restaurants, users};
use crate::{Error, Result};

pub const DEFAULT_PAGE_SIZE: i64 = 100;

pub struct CreateRestaurant {
    pub name: String,
    pub address: String,
    pub city: String,
    pub owner_id: i32,
}

/// Admin operation. The owner must be an existing user; the name is
/// unique platform-wide.
pub fn create(conn: &mut PgConnection, req: CreateRestaurant) -> Result<Restaurant> {
    let owner_exists = users::table
        .find(req.owner_id)
        .select(users::id)
        .first::<i32>(conn)
        .optional()?
        .is_some();
    if !owner_exists {
        return Err(Error::NotFound(format!(
            "User with id {} not found",
            req.owner_id
        )));
    }

    diesel::insert_into(restaurants::table)
        .values(NewRestaurant {
            name: req.name,
            address: req.address,
            city: req.city,
            owner_id: req.owner_id,
        })
        .returning(Restaurant::as_returning())
        .get_result(conn)
        .map_err(|e| Error::conflict_on_unique(e, "Restaurant already exists"))
}

pub fn list(conn: &mut PgConnection, offset: i64, limit: i64) -> Result<Vec<Restaurant>> {
    restaurants::table
        .select(Restaurant::as_select())
        .order(restaurants::id.asc())
        .offset(offset.max(0))
        .limit(limit.clamp(1, DEFAULT_PAGE_SIZE))
        .load(conn)
        .map_err(Error::from)
}

pub fn get(conn: &mut PgConnection, restaurant_id: i32) -> Result<Restaurant> {
    restaurants::table
        .find(restaurant_id)
        .select(Restaurant::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Restaurant with id {restaurant_id} not found")))
}

/// A restaurant plus its menu, each listing joined with the dish
/// definition it prices.
pub fn get_with_menu(
    conn: &mut PgConnection,
    restaurant_id: i32,
) -> Result<(Restaurant, Vec<(RestaurantMenuItem, GlobalDish)>)> {
    let restaurant = get(conn, restaurant_id)?;

    let menu = RestaurantMenuItem::belonging_to(&restaurant)
        .inner_join(crate::schema::global_dishes::table)
        .select((RestaurantMenuItem::as_select(), GlobalDish::as_select()))
        .load(conn)?;

    Ok((restaurant, menu))
}

/// Admin operation. Restrict policy: a restaurant with order history
/// cannot be deleted; its menu items go away with it in the same
/// transaction.
pub fn delete(conn: &mut PgConnection, restaurant_id: i32) -> Result<()> {
    conn.transaction::<_, Error, _>(|conn| {
        let restaurant = get(conn, restaurant_id)?;

        let has_orders = orders::table
            .filter(orders::restaurant_id.eq(restaurant.id))
            .select(orders::id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if has_orders {
            return Err(Error::Conflict(
                "Restaurant has existing orders and cannot be deleted".to_string(),
            ));
        }

        diesel::delete(
            restaurant_menu_items::table
                .filter(restaurant_menu_items::restaurant_id.eq(restaurant.id)),
        )
        .execute(conn)?;
        diesel::delete(restaurants::table.find(restaurant.id)).execute(conn)?;

        Ok(())
    })
}

/// Lists a catalog dish on a restaurant's menu at a restaurant-specific
/// price. The dish is resolved by case-insensitive name; the caller
/// must own the restaurant or be ADMIN.
pub fn add_menu_item(
    conn: &mut PgConnection,
    principal: Principal,
    restaurant_id: i32,
    dish_name: &str,
    price: BigDecimal,
) -> Result<RestaurantMenuItem> {
    let restaurant = get(conn, restaurant_id)?;
    if !restaurant.is_open {
        return Err(Error::NotFound(format!(
            "Restaurant with id {restaurant_id} not found"
        )));
    }
    gate::require_owner_or_admin(principal, restaurant.owner_id)?;

    if price <= BigDecimal::from(0) {
        return Err(Error::Invalid("Price must be positive".to_string()));
    }

    let dish = catalog::find_dish_by_name(conn, dish_name)?;

    diesel::insert_into(restaurant_menu_items::table)
        .values(NewRestaurantMenuItem {
            restaurant_id: restaurant.id,
            global_dish_id: dish.id,
            price,
            is_available: true,
        })
        .returning(RestaurantMenuItem::as_returning())
        .get_result(conn)
        .map_err(|e| Error::conflict_on_unique(e, "Dish is already on this menu"))
}

pub struct MenuItemUpdate {
    pub price: Option<BigDecimal>,
    pub is_available: Option<bool>,
}

/// Re-prices or toggles a listing. Never touches order items: orders
/// keep the price snapshot taken when they were placed.
pub fn update_menu_item(
    conn: &mut PgConnection,
    principal: Principal,
    menu_item_id: i32,
    update: MenuItemUpdate,
) -> Result<RestaurantMenuItem> {
    if update.price.is_none() && update.is_available.is_none() {
        return Err(Error::Invalid("Nothing to update".to_string()));
    }
    if let Some(price) = &update.price {
        if *price <= BigDecimal::from(0) {
            return Err(Error::Invalid("Price must be positive".to_string()));
        }
    }

    let (item, restaurant) = restaurant_menu_items::table
        .find(menu_item_id)
        .inner_join(restaurants::table)
        .select((RestaurantMenuItem::as_select(), Restaurant::as_select()))
        .first::<(RestaurantMenuItem, Restaurant)>(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Menu item with id {menu_item_id} not found")))?;
    gate::require_owner_or_admin(principal, restaurant.owner_id)?;

    diesel::update(restaurant_menu_items::table.find(item.id))
        .set(MenuItemChanges {
            price: update.price,
            is_available: update.is_available,
        })
        .returning(RestaurantMenuItem::as_returning())
        .get_result(conn)
        .map_err(Error::from)
}
