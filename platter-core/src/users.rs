use chrono::Utc;
use diesel::prelude::*;

use crate::auth::gate::{self, Principal};
use crate::auth::password;
use crate::models::{NewUser, User, UserChanges, UserRole};
use crate::schema::users;
use crate::{Error, Result};

pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
            && self.password.is_none()
    }
}

/// Registers a new account with role USER. Duplicate email or phone
/// surfaces as Conflict via the store's unique constraints.
pub fn create(conn: &mut PgConnection, req: RegisterUser) -> Result<User> {
    let hashed_password = password::hash(&req.password)?;

    diesel::insert_into(users::table)
        .values(NewUser {
            name: req.name,
            email: req.email,
            hashed_password,
            phone_number: req.phone_number,
            address: req.address,
            role: UserRole::User,
        })
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|e| Error::conflict_on_unique(e, "Email or phone number already registered"))
}

pub fn find_by_id(conn: &mut PgConnection, user_id: i32) -> Result<User> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("User with id {user_id} not found")))
}

/// Login path: checks email and password together. Unknown email and
/// wrong password fail identically so the API cannot be used to
/// enumerate accounts.
pub fn verify_credentials(conn: &mut PgConnection, email: &str, plaintext: &str) -> Result<User> {
    let user = users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first::<User>(conn)
        .optional()?
        .ok_or(Error::Unauthorized)?;

    if password::verify(plaintext, &user.hashed_password) {
        Ok(user)
    } else {
        Err(Error::Unauthorized)
    }
}

pub fn update_profile(
    conn: &mut PgConnection,
    principal: Principal,
    user_id: i32,
    update: ProfileUpdate,
) -> Result<User> {
    gate::require_owner_or_admin(principal, user_id)?;

    // An empty update must not touch the row (or its updated_at).
    if update.is_empty() {
        return Err(Error::Invalid("Nothing to update".to_string()));
    }

    let hashed_password = match update.password {
        Some(plaintext) => Some(password::hash(&plaintext)?),
        None => None,
    };
    let changes = UserChanges {
        name: update.name,
        phone_number: update.phone_number,
        address: update.address,
        hashed_password,
    };

    diesel::update(users::table.find(user_id))
        .set((changes, users::updated_at.eq(Utc::now())))
        .returning(User::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|e| Error::conflict_on_unique(e, "Phone number already registered"))?
        .ok_or_else(|| Error::NotFound(format!("User with id {user_id} not found")))
}

pub fn delete(conn: &mut PgConnection, principal: Principal, user_id: i32) -> Result<()> {
    gate::require_owner_or_admin(principal, user_id)?;

    let deleted = diesel::delete(users::table.find(user_id))
        .execute(conn)
        .map_err(|e| Error::conflict_on_fk(e, "User still owns restaurants or orders"))?;
    if deleted == 0 {
        return Err(Error::NotFound(format!("User with id {user_id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_none_profile_update_is_empty() {
        let update = ProfileUpdate {
            name: None,
            phone_number: None,
            address: None,
            password: None,
        };
        assert!(update.is_empty());
    }

    #[test]
    fn any_set_field_makes_the_update_non_empty() {
        let update = ProfileUpdate {
            name: None,
            phone_number: Some("010-0000-0000".to_string()),
            address: None,
            password: None,
        };
        assert!(!update.is_empty());

        let update = ProfileUpdate {
            name: None,
            phone_number: None,
            address: None,
            password: Some("new-password".to_string()),
        };
        assert!(!update.is_empty());
    }
}
