use diesel::prelude::*;

use crate::models::{GlobalDish, NewGlobalDish};
use crate::schema::global_dishes;
use crate::{Error, Result};

diesel::define_sql_function! {
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Adds a dish definition to the shared catalog. Names are unique
/// case-insensitively ("Veg Burger" and "veg burger" are the same
/// dish), enforced by a lower(name) unique index.
pub fn create_dish(conn: &mut PgConnection, dish: NewGlobalDish) -> Result<GlobalDish> {
    diesel::insert_into(global_dishes::table)
        .values(dish)
        .returning(GlobalDish::as_returning())
        .get_result(conn)
        .map_err(|e| Error::conflict_on_unique(e, "Dish already exists"))
}

pub fn list_dishes(conn: &mut PgConnection) -> Result<Vec<GlobalDish>> {
    global_dishes::table
        .select(GlobalDish::as_select())
        .order(global_dishes::name.asc())
        .load(conn)
        .map_err(Error::from)
}

pub fn find_dish(conn: &mut PgConnection, dish_id: i32) -> Result<GlobalDish> {
    global_dishes::table
        .find(dish_id)
        .select(GlobalDish::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Dish with id {dish_id} not found")))
}

/// Menu additions reference dishes by name, matched case-insensitively.
pub fn find_dish_by_name(conn: &mut PgConnection, name: &str) -> Result<GlobalDish> {
    global_dishes::table
        .filter(lower(global_dishes::name).eq(name.to_lowercase()))
        .select(GlobalDish::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Dish '{name}' is not in the catalog")))
}

/// A dish that is still listed on any menu cannot be removed; the
/// foreign key from menu items makes that a Conflict.
pub fn delete_dish(conn: &mut PgConnection, dish_id: i32) -> Result<()> {
    let deleted = diesel::delete(global_dishes::table.find(dish_id))
        .execute(conn)
        .map_err(|e| Error::conflict_on_fk(e, "Dish is still listed on restaurant menus"))?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("Dish with id {dish_id} not found")));
    }
    Ok(())
}
