use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use model::entities::prelude::{Building, Profile, User, UserBuilding};
use model::entities::user_building::Relationship;
use model::entities::{building, profile, user, user_building};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::auth::password::{hash_password, policy_violations};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::buildings::BuildingResponse;
use crate::lifecycle;
use crate::pagination::{paginate, Page, PageQuery};
use crate::policy;
use crate::schemas::{AppState, MessageResponse};

/// Bare user identity
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
        }
    }
}

/// Profile contact fields
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileBody {
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl From<profile::Model> for ProfileBody {
    fn from(model: profile::Model) -> Self {
        Self {
            phone: model.phone,
            address: model.address,
        }
    }
}

/// User identity with its profile attached
#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithProfile {
    pub id: i32,
    pub username: String,
    pub profile: Option<ProfileBody>,
}

impl UserWithProfile {
    pub fn new(user_model: user::Model, profile_model: Option<profile::Model>) -> Self {
        Self {
            id: user_model.id,
            username: user_model.username,
            profile: profile_model.map(ProfileBody::from),
        }
    }
}

/// List-entry envelope: `{"user": {...}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserWithProfile,
}

/// Request body for updating a user
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    /// Username (must be unique)
    pub username: Option<String>,
    /// New password (validated against the policy)
    pub password: Option<String>,
}

/// Query parameters for a user's building listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct UserBuildingsQuery {
    /// Required: `owner` or `tenant`
    pub category: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// List all users with their profiles (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated users", body = Object),
        (status = 403, description = "Requester is not an admin", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UserEnvelope>>, ApiError> {
    trace!("Entering get_users function");
    policy::list_all(&requester)?;

    let users = User::find()
        .find_also_related(Profile)
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} users from database", users.len());

    let entries: Vec<UserEnvelope> = users
        .into_iter()
        .map(|(u, p)| UserEnvelope {
            user: UserWithProfile::new(u, p),
        })
        .collect();

    let page = paginate(entries, &query, "/api/v1/users")?;
    info!("Successfully listed users for admin {}", requester.id);
    Ok(Json(page))
}

/// Get a single user with its profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved", body = UserWithProfile),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<UserWithProfile>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let (user_model, profile_model) = find_user_with_profile(&state.db, user_id).await?;
    Ok(Json(UserWithProfile::new(user_model, profile_model)))
}

/// Update a user's username and/or password
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Duplicate username or weak password", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    trace!("Entering update_user function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let existing = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;

    let mut user_active: user::ActiveModel = existing.clone().into();
    let mut updated_fields = Vec::new();

    if let Some(username) = request.username {
        if username != existing.username {
            let taken = User::find()
                .filter(user::Column::Username.eq(username.clone()))
                .one(&state.db)
                .await?;
            if taken.is_some() {
                warn!("Update rejected, username '{}' taken", username);
                return Err(ApiError::bad_request("username already exists"));
            }
        }
        user_active.username = Set(username.clone());
        updated_fields.push(format!("username: {username}"));
    }

    if let Some(password) = request.password {
        let violations = policy_violations(&password);
        if !violations.is_empty() {
            return Err(ApiError::WeakPassword(violations));
        }
        user_active.password_hash = Set(hash_password(&password)?);
        updated_fields.push("password".to_string());
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for user ID: {}", user_id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }

    let updated = user_active.update(&state.db).await?;
    info!("User with ID {} updated successfully", user_id);
    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "User still owns a notice", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let txn = state.db.begin().await?;
    let user_model = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    lifecycle::delete_user(&txn, &user_model).await?;
    txn.commit().await?;

    Ok(Json(MessageResponse {
        message: format!("user id {user_id} successfully deleted"),
    }))
}

/// List the buildings a user is tied to, by relationship kind
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/buildings",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("category" = String, Query, description = "owner or tenant"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated buildings", body = Object),
        (status = 400, description = "Bad category", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User or profile not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_buildings(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<UserBuildingsQuery>,
) -> Result<Json<Page<BuildingResponse>>, ApiError> {
    trace!("Entering get_user_buildings function for user_id: {}", user_id);
    policy::manage_user(&requester, user_id)?;

    let category = query
        .category
        .as_deref()
        .and_then(Relationship::parse)
        .ok_or_else(|| ApiError::bad_request("category must be either owner or tenant"))?;

    let (_, profile_model) = find_user_with_profile(&state.db, user_id).await?;
    let profile_model =
        profile_model.ok_or_else(|| ApiError::not_found("profile does not exist"))?;

    let ties = UserBuilding::find()
        .filter(user_building::Column::ProfileId.eq(profile_model.id))
        .filter(user_building::Column::Relationship.eq(category))
        .all(&state.db)
        .await?;
    let building_ids: Vec<i32> = ties.iter().map(|t| t.building_id).collect();
    debug!(
        "User {} holds {} '{}' tie(s)",
        user_id,
        building_ids.len(),
        category.as_str()
    );

    let buildings = Building::find()
        .filter(building::Column::Id.is_in(building_ids))
        .all(&state.db)
        .await?;
    let responses: Vec<BuildingResponse> =
        buildings.into_iter().map(BuildingResponse::from).collect();

    let page_query = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let page = paginate(
        responses,
        &page_query,
        &format!("/api/v1/users/{user_id}/buildings"),
    )?;
    Ok(Json(page))
}

/// Load a user and its profile, or 404 with the user-level message.
pub(crate) async fn find_user_with_profile<C: sea_orm::ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<(user::Model, Option<profile::Model>), ApiError> {
    let user_model = User::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    let profile_model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok((user_model, profile_model))
}
