//! Relationship-ledger lookups and guarded mutations.
//!
//! The ledger (`user_buildings`) is consulted by the policy evaluator on
//! nearly every request; the mutations here enforce the two application
//! invariants the schema alone cannot: at most one tie per (profile,
//! building), and a building never losing its last owner.

use model::entities::prelude::*;
use model::entities::user_building::Relationship;
use model::entities::{profile, user_building};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::debug;

use crate::error::ApiError;

/// How `user_id` relates to `building_id`, if at all. A user without a
/// profile relates to nothing.
pub async fn relationship_for<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    building_id: i32,
) -> Result<Option<Relationship>, ApiError> {
    let Some(profile_model) = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let tie = UserBuilding::find_by_id((profile_model.id, building_id))
        .one(conn)
        .await?;
    Ok(tie.map(|t| t.relationship))
}

/// Number of `owner` ties a building currently holds.
pub async fn owner_count<C: ConnectionTrait>(
    conn: &C,
    building_id: i32,
) -> Result<u64, ApiError> {
    let count = UserBuilding::find()
        .filter(user_building::Column::BuildingId.eq(building_id))
        .filter(user_building::Column::Relationship.eq(Relationship::Owner))
        .count(conn)
        .await?;
    Ok(count)
}

/// Tie a profile to a building. A profile holds at most one tie per
/// building, whatever its kind.
pub async fn add_tie<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    building_id: i32,
    relationship: Relationship,
) -> Result<(), ApiError> {
    let existing = UserBuilding::find_by_id((profile_id, building_id))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("user profile already linked to building"));
    }

    user_building::ActiveModel {
        profile_id: Set(profile_id),
        building_id: Set(building_id),
        relationship: Set(relationship),
    }
    .insert(conn)
    .await?;
    debug!(
        "Linked profile {} to building {} as {}",
        profile_id,
        building_id,
        relationship.as_str()
    );
    Ok(())
}

/// Remove a tie, refusing to strip a building of its last owner.
pub async fn remove_tie<C: ConnectionTrait>(
    conn: &C,
    profile_id: i32,
    building_id: i32,
) -> Result<(), ApiError> {
    let tie = UserBuilding::find_by_id((profile_id, building_id))
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::not_found("user profile not linked to building"))?;

    if tie.relationship == Relationship::Owner && owner_count(conn, building_id).await? <= 1 {
        return Err(ApiError::conflict("cannot delete building only owner"));
    }

    UserBuilding::delete_by_id((profile_id, building_id))
        .exec(conn)
        .await?;
    debug!(
        "Unlinked profile {} from building {}",
        profile_id, building_id
    );
    Ok(())
}
