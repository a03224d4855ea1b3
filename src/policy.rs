//! Authorization policy evaluator.
//!
//! Pure decision functions consulted by every handler before it touches the
//! store. Each takes the requester identity, the target, and the outcome of
//! a relationship-ledger lookup, and answers allow/deny with a reason that
//! becomes the 403 body. Priority order: admin, then resource owner / self,
//! then an exact relationship match, then the most specific denial.

use model::entities::user_building::Relationship;

use crate::auth::CurrentUser;
use crate::error::ApiError;

/// A denied decision and the reason surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denial(pub &'static str);

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        ApiError::Forbidden(denial.0.to_string())
    }
}

type Decision = Result<(), Denial>;

/// Act on a user record or anything scoped to it: admin or the user itself.
pub fn manage_user(requester: &CurrentUser, target_user_id: i32) -> Decision {
    if requester.is_admin || requester.id == target_user_id {
        Ok(())
    } else {
        Err(Denial("user not authorized to perform this action"))
    }
}

/// Collection-wide reads (all users, all notices, all comments): admin only.
pub fn list_all(requester: &CurrentUser) -> Decision {
    if requester.is_admin {
        Ok(())
    } else {
        Err(Denial("user lacks permission to access this data"))
    }
}

/// Register a building under `owner_user_id`: admin or that user itself.
pub fn create_building_for(requester: &CurrentUser, owner_user_id: i32) -> Decision {
    if requester.is_admin || requester.id == owner_user_id {
        Ok(())
    } else {
        Err(Denial("user does not have necessary permission"))
    }
}

/// Mutate (update or delete) a building: admin or an `owner` relationship.
/// A tenant tie and no tie at all produce distinct denials.
pub fn modify_building(requester: &CurrentUser, relationship: Option<Relationship>) -> Decision {
    if requester.is_admin {
        return Ok(());
    }
    match relationship {
        Some(Relationship::Owner) => Ok(()),
        Some(_) => Err(Denial("user does not have permission to modify this building")),
        None => Err(Denial("user profile is not linked to the building")),
    }
}

/// Add or remove ledger rows for a building: admin or an `owner`
/// relationship, with the no-tie case called out explicitly.
pub fn manage_ledger(requester: &CurrentUser, relationship: Option<Relationship>) -> Decision {
    if requester.is_admin {
        return Ok(());
    }
    match relationship {
        Some(Relationship::Owner) => Ok(()),
        Some(_) => Err(Denial("user does not have permission to modify this building")),
        None => Err(Denial(
            "user does not have permission to modify this building, profile not linked to building",
        )),
    }
}

/// Read building-scoped collections (members, notices, comments): admin or
/// any relationship to the building.
pub fn view_building_scoped(requester: &CurrentUser, relationship: Option<Relationship>) -> Decision {
    if requester.is_admin || relationship.is_some() {
        Ok(())
    } else {
        Err(Denial("user profile not linked to building"))
    }
}

/// Author a notice on a building: requires an `owner` relationship. Admins
/// get no exemption here; a notice is always issued by an owner.
pub fn author_notice(relationship: Option<Relationship>) -> Decision {
    match relationship {
        Some(Relationship::Owner) => Ok(()),
        Some(_) => Err(Denial("cannot create notice if not owner")),
        None => Err(Denial("user profile not linked to building")),
    }
}

/// Author a comment on a building: requires a `tenant` relationship.
pub fn author_comment(relationship: Option<Relationship>) -> Decision {
    match relationship {
        Some(Relationship::Tenant) => Ok(()),
        Some(_) => Err(Denial("cannot comment if not tenant")),
        None => Err(Denial("user profile not linked to building")),
    }
}

/// Authoring on behalf of someone else is never allowed, admin or not.
pub fn act_as_author(requester: &CurrentUser, author_id: i32, reason: &'static str) -> Decision {
    if requester.id == author_id {
        Ok(())
    } else {
        Err(Denial(reason))
    }
}

/// Read, edit or delete an existing announcement: admin or its author.
/// `author_id` is `None` for comments whose tenant reference was nulled.
pub fn touch_announcement(requester: &CurrentUser, author_id: Option<i32>) -> Decision {
    if requester.is_admin || author_id == Some(requester.id) {
        Ok(())
    } else {
        Err(Denial("user not authorized to perform this action"))
    }
}

/// Read user-scoped announcement collections: admin or the user itself.
pub fn view_user_scoped(requester: &CurrentUser, target_user_id: i32) -> Decision {
    if requester.is_admin || requester.id == target_user_id {
        Ok(())
    } else {
        Err(Denial("permission denied"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "admin".to_string(),
            is_admin: true,
        }
    }

    fn user(id: i32) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user{id}"),
            is_admin: false,
        }
    }

    #[test]
    fn test_manage_user() {
        assert_eq!(manage_user(&admin(), 42), Ok(()));
        assert_eq!(manage_user(&user(42), 42), Ok(()));
        assert_eq!(
            manage_user(&user(7), 42),
            Err(Denial("user not authorized to perform this action"))
        );
    }

    #[test]
    fn test_list_all_is_admin_only() {
        assert_eq!(list_all(&admin()), Ok(()));
        assert_eq!(
            list_all(&user(7)),
            Err(Denial("user lacks permission to access this data"))
        );
    }

    #[test]
    fn test_create_building_for() {
        assert_eq!(create_building_for(&admin(), 42), Ok(()));
        assert_eq!(create_building_for(&user(42), 42), Ok(()));
        assert_eq!(
            create_building_for(&user(7), 42),
            Err(Denial("user does not have necessary permission"))
        );
    }

    #[test]
    fn test_modify_building_distinguishes_denials() {
        assert_eq!(modify_building(&admin(), None), Ok(()));
        assert_eq!(modify_building(&user(7), Some(Relationship::Owner)), Ok(()));
        assert_eq!(
            modify_building(&user(7), Some(Relationship::Tenant)),
            Err(Denial("user does not have permission to modify this building"))
        );
        assert_eq!(
            modify_building(&user(7), None),
            Err(Denial("user profile is not linked to the building"))
        );
    }

    #[test]
    fn test_manage_ledger_distinguishes_denials() {
        assert_eq!(manage_ledger(&admin(), None), Ok(()));
        assert_eq!(manage_ledger(&user(7), Some(Relationship::Owner)), Ok(()));
        assert_eq!(
            manage_ledger(&user(7), Some(Relationship::Tenant)),
            Err(Denial("user does not have permission to modify this building"))
        );
        assert_eq!(
            manage_ledger(&user(7), None),
            Err(Denial(
                "user does not have permission to modify this building, profile not linked to building"
            ))
        );
    }

    #[test]
    fn test_view_building_scoped() {
        assert_eq!(view_building_scoped(&admin(), None), Ok(()));
        assert_eq!(
            view_building_scoped(&user(7), Some(Relationship::Tenant)),
            Ok(())
        );
        assert_eq!(
            view_building_scoped(&user(7), Some(Relationship::Owner)),
            Ok(())
        );
        assert_eq!(
            view_building_scoped(&user(7), None),
            Err(Denial("user profile not linked to building"))
        );
    }

    #[test]
    fn test_author_notice_requires_owner() {
        assert_eq!(author_notice(Some(Relationship::Owner)), Ok(()));
        assert_eq!(
            author_notice(Some(Relationship::Tenant)),
            Err(Denial("cannot create notice if not owner"))
        );
        assert_eq!(
            author_notice(None),
            Err(Denial("user profile not linked to building"))
        );
    }

    #[test]
    fn test_author_comment_requires_tenant() {
        assert_eq!(author_comment(Some(Relationship::Tenant)), Ok(()));
        assert_eq!(
            author_comment(Some(Relationship::Owner)),
            Err(Denial("cannot comment if not tenant"))
        );
        assert_eq!(
            author_comment(None),
            Err(Denial("user profile not linked to building"))
        );
    }

    #[test]
    fn test_act_as_author_has_no_admin_exemption() {
        assert_eq!(act_as_author(&user(7), 7, "nope"), Ok(()));
        assert_eq!(act_as_author(&admin(), 7, "nope"), Err(Denial("nope")));
    }

    #[test]
    fn test_touch_announcement() {
        assert_eq!(touch_announcement(&admin(), Some(7)), Ok(()));
        assert_eq!(touch_announcement(&user(7), Some(7)), Ok(()));
        assert_eq!(
            touch_announcement(&user(7), Some(8)),
            Err(Denial("user not authorized to perform this action"))
        );
        // An orphaned comment (tenant nulled) is admin-only.
        assert_eq!(touch_announcement(&admin(), None), Ok(()));
        assert_eq!(
            touch_announcement(&user(7), None),
            Err(Denial("user not authorized to perform this action"))
        );
    }

    #[test]
    fn test_view_user_scoped() {
        assert_eq!(view_user_scoped(&admin(), 42), Ok(()));
        assert_eq!(view_user_scoped(&user(42), 42), Ok(()));
        assert_eq!(
            view_user_scoped(&user(7), 42),
            Err(Denial("permission denied"))
        );
    }
}
