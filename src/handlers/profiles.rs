use axum::{
    extract::{Path, State},
    response::Json,
};
use model::entities::profile;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::users::{find_user_with_profile, ProfileBody, UserWithProfile};
use crate::lifecycle;
use crate::policy;
use crate::schemas::{AppState, MessageResponse};

/// Request body for updating profile contact fields
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Get a user's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/profile",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved", body = UserWithProfile),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User or profile not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<UserWithProfile>, ApiError> {
    trace!("Entering get_profile function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let (user_model, profile_model) = find_user_with_profile(&state.db, user_id).await?;
    let profile_model =
        profile_model.ok_or_else(|| ApiError::not_found("profile does not exist"))?;

    Ok(Json(UserWithProfile::new(user_model, Some(profile_model))))
}

/// Update a user's profile contact fields
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}/profile",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileBody),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User or profile not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileBody>, ApiError> {
    trace!("Entering update_profile function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let (_, profile_model) = find_user_with_profile(&state.db, user_id).await?;
    let profile_model =
        profile_model.ok_or_else(|| ApiError::not_found("profile does not exist"))?;

    let mut profile_active: profile::ActiveModel = profile_model.into();
    if let Some(phone) = request.phone {
        debug!("Updating profile phone for user {}", user_id);
        profile_active.phone = Set(Some(phone));
    }
    if let Some(address) = request.address {
        debug!("Updating profile address for user {}", user_id);
        profile_active.address = Set(Some(address));
    }

    let updated = profile_active.update(&state.db).await?;
    info!("Profile for user {} updated successfully", user_id);
    Ok(Json(ProfileBody::from(updated)))
}

/// Delete a user's profile. Buildings left without any remaining profile
/// tie are deleted as well.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/profile",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User or profile not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "An orphaned building still has notices", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_profile function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let txn = state.db.begin().await?;
    let (_, profile_model) = find_user_with_profile(&txn, user_id).await?;
    let profile_model =
        profile_model.ok_or_else(|| ApiError::not_found("profile does not exist"))?;
    lifecycle::delete_profile(&txn, &profile_model).await?;
    txn.commit().await?;

    Ok(Json(MessageResponse {
        message: format!("user id {user_id} profile successfully deleted"),
    }))
}
