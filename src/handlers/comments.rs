use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::comment;
use model::entities::prelude::{Building, Comment, User};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::ledger;
use crate::pagination::{paginate, Page, PageQuery};
use crate::policy;
use crate::schemas::{AppState, MessageResponse};

/// Request body for creating a comment
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCommentRequest {
    /// Authoring tenant's user ID; must be the requester
    pub tenant: Option<i32>,
    /// Target building ID
    pub building: Option<i32>,
    pub comment: Option<String>,
}

/// Request body for updating a comment. Tenant and building are immutable;
/// their presence in the payload is rejected outright.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub comment: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub tenant: Option<serde_json::Value>,
    #[schema(value_type = Option<i32>)]
    pub building: Option<serde_json::Value>,
}

/// Comment response model. `tenant` is null when the author was deleted.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub tenant: Option<i32>,
    pub building: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            tenant: model.tenant_id,
            building: model.building_id,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List every comment (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/comments",
    tag = "comments",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated comments", body = Object),
        (status = 403, description = "Requester is not an admin", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_comments(
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CommentResponse>>, ApiError> {
    trace!("Entering get_comments function");
    policy::list_all(&requester)?;

    let comments = Comment::find()
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} comments from database", comments.len());

    let responses: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();
    let page = paginate(responses, &query, "/api/v1/comments")?;
    Ok(Json(page))
}

/// Create a comment; the author must hold a `tenant` tie to the building
#[utoipa::path(
    post,
    path = "/api/v1/comments",
    tag = "comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Missing fields or dangling references", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Author is not a tenant of the building", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_comment(
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    trace!("Entering create_comment function");

    let (Some(tenant), Some(building_id), Some(text)) =
        (request.tenant, request.building, request.comment)
    else {
        return Err(ApiError::bad_request("tenant, building and comment are required"));
    };

    policy::act_as_author(&requester, tenant, "user lacks necessary permissions")?;

    let txn = state.db.begin().await?;
    Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::bad_request("building does not exist"))?;
    User::find_by_id(tenant)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::bad_request("user does not exist"))?;

    let relationship = ledger::relationship_for(&txn, tenant, building_id).await?;
    policy::author_comment(relationship)?;

    let now = Utc::now();
    let comment_model = comment::ActiveModel {
        tenant_id: Set(Some(tenant)),
        building_id: Set(building_id),
        comment: Set(text),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Comment {} created by tenant {} on building {}",
        comment_model.id, tenant, building_id
    );
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from(comment_model)),
    ))
}

/// Get a single comment (admin or author)
#[utoipa::path(
    get,
    path = "/api/v1/comments/{comment_id}",
    tag = "comments",
    params(
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment retrieved", body = CommentResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_comment(
    Path(comment_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<CommentResponse>, ApiError> {
    trace!("Entering get_comment function for comment_id: {}", comment_id);

    let comment_model = find_comment(&state, comment_id).await?;
    policy::touch_announcement(&requester, comment_model.tenant_id)?;
    Ok(Json(CommentResponse::from(comment_model)))
}

/// Update a comment's text (admin or author)
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{comment_id}",
    tag = "comments",
    params(
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Attempted to change tenant or building", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_comment(
    Path(comment_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    trace!("Entering update_comment function for comment_id: {}", comment_id);

    let comment_model = find_comment(&state, comment_id).await?;
    policy::touch_announcement(&requester, comment_model.tenant_id)?;

    if request.tenant.is_some() || request.building.is_some() {
        warn!(
            "Rejected immutable-field update on comment {} by user {}",
            comment_id, requester.id
        );
        return Err(ApiError::bad_request("tenant and building fields cannot be changed"));
    }

    let mut comment_active: comment::ActiveModel = comment_model.into();
    if let Some(text) = request.comment {
        debug!("Updating comment {} text", comment_id);
        comment_active.comment = Set(text);
    }
    comment_active.updated_at = Set(Utc::now());

    let updated = comment_active.update(&state.db).await?;
    info!("Comment {} updated successfully", comment_id);
    Ok(Json(CommentResponse::from(updated)))
}

/// Delete a comment (admin or author)
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{comment_id}",
    tag = "comments",
    params(
        ("comment_id" = i32, Path, description = "Comment ID"),
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Comment not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_comment(
    Path(comment_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_comment function for comment_id: {}", comment_id);

    let comment_model = find_comment(&state, comment_id).await?;
    policy::touch_announcement(&requester, comment_model.tenant_id)?;

    Comment::delete_by_id(comment_id).exec(&state.db).await?;
    info!("Comment {} deleted", comment_id);
    Ok(Json(MessageResponse {
        message: format!("comment {comment_id} successfully deleted"),
    }))
}

/// List a building's comments (admin or any linked profile)
#[utoipa::path(
    get,
    path = "/api/v1/buildings/{building_id}/comments",
    tag = "comments",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated comments", body = Object),
        (status = 403, description = "Profile not linked to building", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_building_comments(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CommentResponse>>, ApiError> {
    trace!(
        "Entering get_building_comments function for building_id: {}",
        building_id
    );

    Building::find_by_id(building_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Building does not exist"))?;

    let relationship = ledger::relationship_for(&state.db, requester.id, building_id).await?;
    policy::view_building_scoped(&requester, relationship)?;

    let comments = Comment::find()
        .filter(comment::Column::BuildingId.eq(building_id))
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;
    let responses: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();

    let page = paginate(
        responses,
        &query,
        &format!("/api/v1/buildings/{building_id}/comments"),
    )?;
    Ok(Json(page))
}

/// List a user's comments (admin or the user itself)
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/comments",
    tag = "comments",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated comments", body = Object),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_comments(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CommentResponse>>, ApiError> {
    trace!("Entering get_user_comments function for user_id: {}", user_id);

    User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    policy::view_user_scoped(&requester, user_id)?;

    let comments = Comment::find()
        .filter(comment::Column::TenantId.eq(user_id))
        .order_by_asc(comment::Column::Id)
        .all(&state.db)
        .await?;
    let responses: Vec<CommentResponse> =
        comments.into_iter().map(CommentResponse::from).collect();

    let page = paginate(
        responses,
        &query,
        &format!("/api/v1/users/{user_id}/comments"),
    )?;
    Ok(Json(page))
}

async fn find_comment(state: &AppState, comment_id: i32) -> Result<comment::Model, ApiError> {
    Comment::find_by_id(comment_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("comment id does not exist"))
}
