//! Entity deletion procedures.
//!
//! The cascade / protect / null-on-delete semantics between users, profiles,
//! buildings and announcements are enforced here as explicit steps, always
//! executed on the caller's transaction so the guard checks and the
//! mutations observe one snapshot. Handlers begin the transaction, call one
//! of these, and commit only on success.

use model::entities::prelude::*;
use model::entities::{comment, notice, profile, user, user_building};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::{debug, info};

use crate::error::ApiError;

/// Delete a building, cascading its comments and ledger rows. Refused while
/// any notice still references it; the caller must delete the notices first.
pub async fn delete_building<C: ConnectionTrait>(
    conn: &C,
    building_id: i32,
) -> Result<(), ApiError> {
    let notices = Notice::find()
        .filter(notice::Column::BuildingId.eq(building_id))
        .count(conn)
        .await?;
    if notices > 0 {
        debug!(
            "Refusing to delete building {}: {} unresolved notice(s)",
            building_id, notices
        );
        return Err(ApiError::conflict("building has an unresolved notice"));
    }

    Comment::delete_many()
        .filter(comment::Column::BuildingId.eq(building_id))
        .exec(conn)
        .await?;
    UserBuilding::delete_many()
        .filter(user_building::Column::BuildingId.eq(building_id))
        .exec(conn)
        .await?;
    Building::delete_by_id(building_id).exec(conn).await?;
    info!("Building {} deleted", building_id);
    Ok(())
}

/// Delete a profile and clean up the buildings it leaves orphaned: any
/// building whose only remaining ledger row belonged to this profile goes
/// with it. Orphan deletion follows the building rules, so an orphan with
/// notices aborts the whole operation.
pub async fn delete_profile<C: ConnectionTrait>(
    conn: &C,
    profile_model: &profile::Model,
) -> Result<(), ApiError> {
    let ties = UserBuilding::find()
        .filter(user_building::Column::ProfileId.eq(profile_model.id))
        .all(conn)
        .await?;

    UserBuilding::delete_many()
        .filter(user_building::Column::ProfileId.eq(profile_model.id))
        .exec(conn)
        .await?;

    for tie in &ties {
        let remaining = UserBuilding::find()
            .filter(user_building::Column::BuildingId.eq(tie.building_id))
            .count(conn)
            .await?;
        if remaining == 0 {
            debug!(
                "Building {} orphaned by deletion of profile {}",
                tie.building_id, profile_model.id
            );
            delete_building(conn, tie.building_id).await?;
        }
    }

    Profile::delete_by_id(profile_model.id).exec(conn).await?;
    info!("Profile {} deleted", profile_model.id);
    Ok(())
}

/// Delete a user account. Blocked while the user still owns a notice (the
/// notice's building necessarily still exists, since buildings cannot be
/// deleted under a notice either). Comments lose their author reference but
/// survive; the profile goes through the orphan-cleanup path.
pub async fn delete_user<C: ConnectionTrait>(
    conn: &C,
    user_model: &user::Model,
) -> Result<(), ApiError> {
    let owned_notices = Notice::find()
        .filter(notice::Column::OwnerId.eq(user_model.id))
        .count(conn)
        .await?;
    if owned_notices > 0 {
        debug!(
            "Refusing to delete user {}: {} protected notice(s)",
            user_model.id, owned_notices
        );
        return Err(ApiError::conflict("building has an unresolved notice"));
    }

    Comment::update_many()
        .col_expr(comment::Column::TenantId, Expr::value(Option::<i32>::None))
        .filter(comment::Column::TenantId.eq(user_model.id))
        .exec(conn)
        .await?;

    if let Some(profile_model) = Profile::find()
        .filter(profile::Column::UserId.eq(user_model.id))
        .one(conn)
        .await?
    {
        delete_profile(conn, &profile_model).await?;
    }

    User::delete_by_id(user_model.id).exec(conn).await?;
    info!("User {} deleted", user_model.id);
    Ok(())
}
