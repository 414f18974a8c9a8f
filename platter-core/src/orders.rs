use bigdecimal::BigDecimal;
use diesel::dsl;
use diesel::prelude::*;

use crate::auth::gate::{self, Principal};
use crate::models::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, Restaurant, RestaurantMenuItem,
};
use crate::schema::{order_items, orders, restaurant_menu_items, restaurants};
use crate::{Error, Result};

pub struct OrderLine {
    pub menu_item_id: i32,
    pub quantity: i32,
}

pub struct PlaceOrder {
    pub restaurant_id: i32,
    pub delivery_address: String,
    pub items: Vec<OrderLine>,
}

/// A validated, fully priced order that has not been written yet.
/// `price_at_order` is frozen here and never re-derived: later menu
/// price edits must not change what a placed order cost.
pub struct DraftItem {
    pub menu_item_id: i32,
    pub quantity: i32,
    pub price_at_order: BigDecimal,
}

pub struct Draft {
    pub total_amount: BigDecimal,
    pub items: Vec<DraftItem>,
}

/// Validates and prices an order against the menu items resolved for
/// it. Pure: every rejection happens here, before anything is
/// written, so a failed order leaves zero rows behind.
pub fn build_order(
    restaurant: &Restaurant,
    menu_items: &[RestaurantMenuItem],
    request: &PlaceOrder,
) -> Result<Draft> {
    if request.items.is_empty() {
        return Err(Error::Invalid(
            "Order must contain at least one item".to_string(),
        ));
    }

    let mut items = Vec::with_capacity(request.items.len());
    let mut total_amount = BigDecimal::from(0);
    for line in &request.items {
        if line.quantity < 1 {
            return Err(Error::Invalid(format!(
                "Quantity for menu item {} must be at least 1",
                line.menu_item_id
            )));
        }
        let item = menu_items
            .iter()
            .find(|m| m.id == line.menu_item_id)
            .ok_or_else(|| {
                Error::NotFound(format!("Menu item with id {} not found", line.menu_item_id))
            })?;
        if item.restaurant_id != restaurant.id {
            return Err(Error::Conflict(format!(
                "Menu item {} belongs to a different restaurant",
                line.menu_item_id
            )));
        }
        if !item.is_available {
            return Err(Error::NotFound(format!(
                "Menu item {} is currently unavailable",
                line.menu_item_id
            )));
        }

        let price_at_order = item.price.clone();
        total_amount += &price_at_order * BigDecimal::from(line.quantity);
        items.push(DraftItem {
            menu_item_id: item.id,
            quantity: line.quantity,
            price_at_order,
        });
    }

    Ok(Draft {
        total_amount,
        items,
    })
}

/// The one multi-entity write in the system: resolves the restaurant
/// and the requested menu items, builds the draft, then persists the
/// order and all its items in a single transaction.
pub fn place(
    conn: &mut PgConnection,
    user_id: i32,
    request: &PlaceOrder,
) -> Result<(Order, Vec<OrderItem>)> {
    let restaurant = restaurants::table
        .find(request.restaurant_id)
        .select(Restaurant::as_select())
        .first::<Restaurant>(conn)
        .optional()?;
    let restaurant = match restaurant {
        // Closed restaurants reject new orders.
        Some(r) if r.is_open => r,
        _ => {
            return Err(Error::NotFound(format!(
                "Restaurant with id {} not found",
                request.restaurant_id
            )))
        }
    };

    let requested_ids: Vec<i32> = request.items.iter().map(|l| l.menu_item_id).collect();
    let menu_items = restaurant_menu_items::table
        .filter(restaurant_menu_items::id.eq_any(&requested_ids))
        .select(RestaurantMenuItem::as_select())
        .load(conn)?;

    let draft = build_order(&restaurant, &menu_items, request)?;

    conn.transaction::<_, Error, _>(|conn| {
        let order = diesel::insert_into(orders::table)
            .values(NewOrder {
                user_id,
                restaurant_id: restaurant.id,
                total_amount: draft.total_amount.clone(),
                status: OrderStatus::Placed,
                delivery_address: request.delivery_address.clone(),
            })
            .returning(Order::as_returning())
            .get_result::<Order>(conn)?;

        let new_items: Vec<NewOrderItem> = draft
            .items
            .iter()
            .map(|i| NewOrderItem {
                order_id: order.id,
                menu_item_id: i.menu_item_id,
                quantity: i.quantity,
                price_at_order: i.price_at_order.clone(),
            })
            .collect();
        let items = diesel::insert_into(order_items::table)
            .values(&new_items)
            .returning(OrderItem::as_returning())
            .get_results(conn)?;

        Ok((order, items))
    })
}

pub fn get(
    conn: &mut PgConnection,
    principal: Principal,
    order_id: i32,
) -> Result<(Order, Vec<OrderItem>)> {
    let order = orders::table
        .find(order_id)
        .select(Order::as_select())
        .first::<Order>(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Order with id {order_id} not found")))?;
    gate::require_owner_or_admin(principal, order.user_id)?;

    let items = OrderItem::belonging_to(&order)
        .select(OrderItem::as_select())
        .load(conn)?;

    Ok((order, items))
}

pub fn list_for_user(
    conn: &mut PgConnection,
    principal: Principal,
    user_id: i32,
) -> Result<Vec<(Order, Vec<OrderItem>)>> {
    gate::require_owner_or_admin(principal, user_id)?;

    let user_orders = orders::table
        .filter(orders::user_id.eq(user_id))
        .select(Order::as_select())
        .order(orders::created_at.desc())
        .load::<Order>(conn)?;

    let items = OrderItem::belonging_to(&user_orders)
        .select(OrderItem::as_select())
        .load::<OrderItem>(conn)?
        .grouped_by(&user_orders);

    Ok(user_orders.into_iter().zip(items).collect())
}

/// Moves an order along its lifecycle. Allowed for ADMIN or the admin
/// owning the order's restaurant; the transition must be legal per
/// `OrderStatus::can_transition_to`.
/// The locked read behind `update_status`: the row lock holds the
/// status steady between the transition check and the write, so two
/// concurrent updates serialize and the loser re-validates against
/// the committed status.
fn order_for_update(
    order_id: i32,
) -> dsl::ForUpdate<dsl::Select<dsl::Find<orders::table, i32>, dsl::AsSelect<Order, diesel::pg::Pg>>>
{
    orders::table
        .find(order_id)
        .select(Order::as_select())
        .for_update()
}

pub fn update_status(
    conn: &mut PgConnection,
    principal: Principal,
    order_id: i32,
    next: OrderStatus,
) -> Result<(Order, Vec<OrderItem>)> {
    conn.transaction::<_, Error, _>(|conn| {
        let order = order_for_update(order_id)
            .first::<Order>(conn)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Order with id {order_id} not found")))?;

        let restaurant = restaurants::table
            .find(order.restaurant_id)
            .select(Restaurant::as_select())
            .first::<Restaurant>(conn)?;
        gate::require_owner_or_admin(principal, restaurant.owner_id)?;

        if !order.status.can_transition_to(next) {
            return Err(Error::Invalid(format!(
                "Order cannot move from {} to {}",
                order.status, next
            )));
        }

        let order = diesel::update(orders::table.find(order.id))
            .set(orders::status.eq(next))
            .returning(Order::as_returning())
            .get_result::<Order>(conn)?;

        let items = OrderItem::belonging_to(&order)
            .select(OrderItem::as_select())
            .load(conn)?;

        Ok((order, items))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn restaurant(id: i32) -> Restaurant {
        Restaurant {
            id,
            name: "Test Restaurant".to_string(),
            address: "Test Address".to_string(),
            city: "Test City".to_string(),
            rating: 0.0,
            is_open: true,
            owner_id: 1,
        }
    }

    fn menu_item(id: i32, restaurant_id: i32, price: &str) -> RestaurantMenuItem {
        RestaurantMenuItem {
            id,
            restaurant_id,
            global_dish_id: id,
            price: BigDecimal::from_str(price).unwrap(),
            is_available: true,
        }
    }

    fn request(restaurant_id: i32, items: Vec<(i32, i32)>) -> PlaceOrder {
        PlaceOrder {
            restaurant_id,
            delivery_address: "42 Delivery Lane".to_string(),
            items: items
                .into_iter()
                .map(|(menu_item_id, quantity)| OrderLine {
                    menu_item_id,
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn totals_are_exact_sums_of_snapshots() {
        let r = restaurant(1);
        let menu = vec![menu_item(10, 1, "100.00"), menu_item(11, 1, "50.00")];
        let draft = build_order(&r, &menu, &request(1, vec![(10, 2), (11, 1)])).unwrap();

        assert_eq!(draft.items.len(), 2);
        assert_eq!(
            draft.items[0].price_at_order,
            BigDecimal::from_str("100.00").unwrap()
        );
        assert_eq!(
            draft.items[1].price_at_order,
            BigDecimal::from_str("50.00").unwrap()
        );
        assert_eq!(draft.total_amount, BigDecimal::from_str("250.00").unwrap());
    }

    #[test]
    fn snapshot_survives_later_price_edit() {
        let r = restaurant(1);
        let mut menu = vec![menu_item(10, 1, "100.00")];
        let draft = build_order(&r, &menu, &request(1, vec![(10, 1)])).unwrap();

        menu[0].price = BigDecimal::from_str("999.99").unwrap();

        assert_eq!(
            draft.items[0].price_at_order,
            BigDecimal::from_str("100.00").unwrap()
        );
        assert_eq!(draft.total_amount, BigDecimal::from_str("100.00").unwrap());
    }

    #[test]
    fn empty_order_is_invalid() {
        let r = restaurant(1);
        assert!(matches!(
            build_order(&r, &[], &request(1, vec![])),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn zero_or_negative_quantity_is_invalid() {
        let r = restaurant(1);
        let menu = vec![menu_item(10, 1, "10.00")];
        assert!(matches!(
            build_order(&r, &menu, &request(1, vec![(10, 0)])),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            build_order(&r, &menu, &request(1, vec![(10, -2)])),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn unknown_menu_item_is_not_found() {
        let r = restaurant(1);
        let menu = vec![menu_item(10, 1, "10.00")];
        assert!(matches!(
            build_order(&r, &menu, &request(1, vec![(10, 1), (99, 1)])),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn cross_restaurant_item_is_a_conflict() {
        let r = restaurant(1);
        let menu = vec![menu_item(10, 1, "10.00"), menu_item(20, 2, "5.00")];
        assert!(matches!(
            build_order(&r, &menu, &request(1, vec![(10, 1), (20, 1)])),
            Err(Error::Conflict(_))
        ));
    }

    #[test]
    fn unavailable_item_is_not_found() {
        let r = restaurant(1);
        let mut menu = vec![menu_item(10, 1, "10.00")];
        menu[0].is_available = false;
        assert!(matches!(
            build_order(&r, &menu, &request(1, vec![(10, 1)])),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn status_update_reads_under_a_row_lock() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&order_for_update(1)).to_string();
        assert!(sql.contains("FOR UPDATE"), "locking clause missing: {sql}");
    }

    #[test]
    fn one_bad_line_rejects_the_whole_order() {
        let r = restaurant(1);
        let menu = vec![menu_item(10, 1, "10.00"), menu_item(11, 1, "20.00")];
        // Second line has a bad quantity; nothing about the first
        // line makes it through.
        let result = build_order(&r, &menu, &request(1, vec![(10, 1), (11, 0)]));
        assert!(result.is_err());
    }
}
