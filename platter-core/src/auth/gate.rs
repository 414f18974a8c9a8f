use diesel::prelude::*;

use crate::models::UserRole;
use crate::schema::users;
use crate::{Error, Result};

use super::token::TokenService;

/// The authenticated identity behind a request: who, and in what role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub role: UserRole,
}

/// Resolves a raw bearer token into a Principal. The token may
/// outlive its account, so after signature/expiry checks the user row
/// is re-checked; a deleted account fails exactly like a bad token.
pub fn authenticate(
    conn: &mut PgConnection,
    tokens: &TokenService,
    raw_token: &str,
) -> Result<Principal> {
    let claims = tokens.verify(raw_token)?;
    let user_id = claims.sub.parse::<i32>().map_err(|_| Error::Unauthorized)?;

    let exists = users::table
        .find(user_id)
        .select(users::id)
        .first::<i32>(conn)
        .optional()?
        .is_some();
    if !exists {
        return Err(Error::Unauthorized);
    }

    Ok(Principal {
        id: user_id,
        role: claims.role,
    })
}

/// Role gate: passes the principal through unchanged iff its role is
/// in the allowed set.
pub fn authorize(principal: Principal, allowed: &[UserRole]) -> Result<Principal> {
    if allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        Err(Error::Forbidden)
    }
}

/// Ownership gate, independent of role membership: a principal may
/// only touch records it owns, unless it is ADMIN.
pub fn require_owner_or_admin(principal: Principal, owner_id: i32) -> Result<()> {
    if principal.role == UserRole::Admin || principal.id == owner_id {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i32, role: UserRole) -> Principal {
        Principal { id, role }
    }

    #[test]
    fn authorize_passes_member_role_through_unchanged() {
        let p = principal(1, UserRole::User);
        let out = authorize(p, &[UserRole::User, UserRole::RestaurantAdmin]).unwrap();
        assert_eq!(out, p);
        // Idempotent.
        assert_eq!(authorize(out, &[UserRole::User]).unwrap(), p);
    }

    #[test]
    fn authorize_rejects_role_outside_set() {
        let p = principal(1, UserRole::User);
        assert!(matches!(
            authorize(p, &[UserRole::Admin]),
            Err(Error::Forbidden)
        ));
        assert!(matches!(authorize(p, &[]), Err(Error::Forbidden)));
    }

    #[test]
    fn owner_may_touch_own_records() {
        assert!(require_owner_or_admin(principal(5, UserRole::User), 5).is_ok());
    }

    #[test]
    fn non_admin_cannot_touch_other_owners_records() {
        assert!(matches!(
            require_owner_or_admin(principal(5, UserRole::User), 6),
            Err(Error::Forbidden)
        ));
        // Role is not enough; ownership is a second dimension.
        assert!(matches!(
            require_owner_or_admin(principal(5, UserRole::RestaurantAdmin), 6),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn admin_bypasses_ownership() {
        assert!(require_owner_or_admin(principal(5, UserRole::Admin), 6).is_ok());
    }
}
