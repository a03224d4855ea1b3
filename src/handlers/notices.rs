use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::notice;
use model::entities::prelude::{Building, Notice, User};
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

/// Request body for creating a notice
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateNoticeRequest {
    /// Authoring owner's user ID; must be the requester
    pub owner: Option<i32>,
    /// Target building ID
    pub building: Option<i32>,
    pub notice: Option<String>,
}

/// Request body for updating a notice. Owner and building are immutable;
/// their presence in the payload is rejected outright.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateNoticeRequest {
    pub notice: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub owner: Option<serde_json::Value>,
    #[schema(value_type = Option<i32>)]
    pub building: Option<serde_json::Value>,
}

/// Notice response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NoticeResponse {
    pub id: i32,
    pub owner: i32,
    pub building: i32,
    pub notice: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(model: notice::Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner_id,
            building: model.building_id,
            notice: model.notice,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List every notice (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/notices",
    tag = "notices",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated notices", body = Object),
        (status = 403, description = "Requester is not an admin", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notices(
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<NoticeResponse>>, ApiError> {
    trace!("Entering get_notices function");
    policy::list_all(&requester)?;

    let notices = Notice::find()
        .order_by_asc(notice::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} notices from database", notices.len());

    let responses: Vec<NoticeResponse> = notices.into_iter().map(NoticeResponse::from).collect();
    let page = paginate(responses, &query, "/api/v1/notices")?;
    Ok(Json(page))
}

/// Create a notice; the author must hold an `owner` tie to the building
#[utoipa::path(
    post,
    path = "/api/v1/notices",
    tag = "notices",
    request_body = CreateNoticeRequest,
    responses(
        (status = 201, description = "Notice created", body = NoticeResponse),
        (status = 400, description = "Missing fields or dangling references", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Author is not an owner of the building", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_notice(
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<CreateNoticeRequest>,
) -> Result<(StatusCode, Json<NoticeResponse>), ApiError> {
    trace!("Entering create_notice function");

    let (Some(owner), Some(building_id), Some(text)) =
        (request.owner, request.building, request.notice)
    else {
        return Err(ApiError::bad_request("owner, building and notice are required"));
    };

    policy::act_as_author(&requester, owner, "user does not have necessary permission")?;

    // Dangling references surface as value errors, not 404s: the target is
    // named in the payload, not the path.
    let txn = state.db.begin().await?;
    Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::bad_request("building does not exist"))?;
    User::find_by_id(owner)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::bad_request("user does not exist"))?;

    let relationship = ledger::relationship_for(&txn, owner, building_id).await?;
    policy::author_notice(relationship)?;

    let now = Utc::now();
    let notice_model = notice::ActiveModel {
        owner_id: Set(owner),
        building_id: Set(building_id),
        notice: Set(text),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Notice {} created by owner {} on building {}",
        notice_model.id, owner, building_id
    );
    Ok((StatusCode::CREATED, Json(NoticeResponse::from(notice_model))))
}

/// Get a single notice (admin or author)
#[utoipa::path(
    get,
    path = "/api/v1/notices/{notice_id}",
    tag = "notices",
    params(
        ("notice_id" = i32, Path, description = "Notice ID"),
    ),
    responses(
        (status = 200, description = "Notice retrieved", body = NoticeResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Notice not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_notice(
    Path(notice_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<NoticeResponse>, ApiError> {
    trace!("Entering get_notice function for notice_id: {}", notice_id);

    let notice_model = find_notice(&state, notice_id).await?;
    policy::touch_announcement(&requester, Some(notice_model.owner_id))?;
    Ok(Json(NoticeResponse::from(notice_model)))
}

/// Update a notice's text (admin or author)
#[utoipa::path(
    patch,
    path = "/api/v1/notices/{notice_id}",
    tag = "notices",
    params(
        ("notice_id" = i32, Path, description = "Notice ID"),
    ),
    request_body = UpdateNoticeRequest,
    responses(
        (status = 200, description = "Notice updated", body = NoticeResponse),
        (status = 400, description = "Attempted to change owner or building", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Notice not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_notice(
    Path(notice_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<UpdateNoticeRequest>,
) -> Result<Json<NoticeResponse>, ApiError> {
    trace!("Entering update_notice function for notice_id: {}", notice_id);

    let notice_model = find_notice(&state, notice_id).await?;
    policy::touch_announcement(&requester, Some(notice_model.owner_id))?;

    if request.owner.is_some() || request.building.is_some() {
        warn!(
            "Rejected immutable-field update on notice {} by user {}",
            notice_id, requester.id
        );
        return Err(ApiError::bad_request("owner and building fields cannot be changed"));
    }

    let mut notice_active: notice::ActiveModel = notice_model.into();
    if let Some(text) = request.notice {
        debug!("Updating notice {} text", notice_id);
        notice_active.notice = Set(text);
    }
    notice_active.updated_at = Set(Utc::now());

    let updated = notice_active.update(&state.db).await?;
    info!("Notice {} updated successfully", notice_id);
    Ok(Json(NoticeResponse::from(updated)))
}

/// Delete a notice (admin or author). This is what unblocks deletion of the
/// referenced building.
#[utoipa::path(
    delete,
    path = "/api/v1/notices/{notice_id}",
    tag = "notices",
    params(
        ("notice_id" = i32, Path, description = "Notice ID"),
    ),
    responses(
        (status = 200, description = "Notice deleted", body = MessageResponse),
        (status = 403, description = "Not admin or author", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Notice not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_notice(
    Path(notice_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_notice function for notice_id: {}", notice_id);

    let notice_model = find_notice(&state, notice_id).await?;
    policy::touch_announcement(&requester, Some(notice_model.owner_id))?;

    Notice::delete_by_id(notice_id).exec(&state.db).await?;
    info!("Notice {} deleted", notice_id);
    Ok(Json(MessageResponse {
        message: format!("notice {notice_id} successfully deleted"),
    }))
}

/// List a building's notices (admin or any linked profile)
#[utoipa::path(
    get,
    path = "/api/v1/buildings/{building_id}/notices",
    tag = "notices",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated notices", body = Object),
        (status = 403, description = "Profile not linked to building", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_building_notices(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<NoticeResponse>>, ApiError> {
    trace!(
        "Entering get_building_notices function for building_id: {}",
        building_id
    );

    Building::find_by_id(building_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Building does not exist"))?;

    let relationship = ledger::relationship_for(&state.db, requester.id, building_id).await?;
    policy::view_building_scoped(&requester, relationship)?;

    let notices = Notice::find()
        .filter(notice::Column::BuildingId.eq(building_id))
        .order_by_asc(notice::Column::Id)
        .all(&state.db)
        .await?;
    let responses: Vec<NoticeResponse> = notices.into_iter().map(NoticeResponse::from).collect();

    let page = paginate(
        responses,
        &query,
        &format!("/api/v1/buildings/{building_id}/notices"),
    )?;
    Ok(Json(page))
}

/// List a user's notices (admin or the user itself)
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/notices",
    tag = "notices",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated notices", body = Object),
        (status = 403, description = "Not admin or self", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_notices(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<NoticeResponse>>, ApiError> {
    trace!("Entering get_user_notices function for user_id: {}", user_id);

    User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    policy::view_user_scoped(&requester, user_id)?;

    let notices = Notice::find()
        .filter(notice::Column::OwnerId.eq(user_id))
        .order_by_asc(notice::Column::Id)
        .all(&state.db)
        .await?;
    let responses: Vec<NoticeResponse> = notices.into_iter().map(NoticeResponse::from).collect();

    let page = paginate(
        responses,
        &query,
        &format!("/api/v1/users/{user_id}/notices"),
    )?;
    Ok(Json(page))
}

async fn find_notice(state: &AppState, notice_id: i32) -> Result<notice::Model, ApiError> {
    Notice::find_by_id(notice_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("notice id does not exist"))
}
