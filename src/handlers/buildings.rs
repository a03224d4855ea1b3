use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::prelude::{Building, Profile, User, UserBuilding};
use model::entities::user_building::Relationship;
use model::entities::{building, profile, user_building};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::geometry;
use crate::handlers::users::{UserEnvelope, UserWithProfile};
use crate::pagination::{paginate, Page, PageQuery};
use crate::policy;
use crate::schemas::{AppState, MessageResponse};
use crate::{ledger, lifecycle};

/// Request body for registering a building
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBuildingRequest {
    /// User the building is registered under; an `owner` ledger row is
    /// created for its profile
    pub user_id: Option<i32>,
    /// Coordinate pair as "lat, lon"
    pub building: Option<String>,
    pub rent: Option<Decimal>,
    pub payment_details: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub comment: Option<String>,
    pub occupancy: Option<bool>,
}

/// Request body for updating a building
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateBuildingRequest {
    /// Replacement coordinate pair as "lat, lon"
    pub building: Option<String>,
    pub rent: Option<Decimal>,
    pub payment_details: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub comment: Option<String>,
    pub occupancy: Option<bool>,
}

/// Building response model; geometry is GeoJSON with `[lon, lat]` order
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildingResponse {
    pub id: i32,
    #[schema(value_type = Object)]
    pub geometry: geojson::Geometry,
    pub rent: Option<Decimal>,
    pub payment_details: Option<String>,
    pub county: Option<String>,
    pub district: Option<String>,
    pub comment: Option<String>,
    pub occupancy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<building::Model> for BuildingResponse {
    fn from(model: building::Model) -> Self {
        Self {
            id: model.id,
            geometry: geometry::point_geometry(model.longitude, model.latitude),
            rent: model.rent,
            payment_details: model.payment_details,
            county: model.county,
            district: model.district,
            comment: model.comment,
            occupancy: model.occupancy,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Deletion acknowledgement
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteBuildingResponse {
    pub building_id: i32,
    pub status: String,
}

/// Request body for tying a user's profile to a building
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddBuildingUserRequest {
    pub user_id: Option<i32>,
    /// `owner` or `tenant`
    pub relationship: Option<String>,
}

/// Query parameters for the building listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuildingListQuery {
    /// `geojson` selects the bulk FeatureCollection output
    pub format: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Query parameters for the building member listing
#[derive(Debug, Deserialize, ToSchema)]
pub struct BuildingMembersQuery {
    /// Optional filter: `owner` or `tenant`
    pub relationship: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Register a building under a user, creating the `owner` ledger row
#[utoipa::path(
    post,
    path = "/api/v1/buildings",
    tag = "buildings",
    request_body = CreateBuildingRequest,
    responses(
        (status = 201, description = "Building created", body = BuildingResponse),
        (status = 400, description = "Missing fields or bad coordinate", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not admin or the target user", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User or profile not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_building(
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<CreateBuildingRequest>,
) -> Result<(StatusCode, Json<BuildingResponse>), ApiError> {
    trace!("Entering create_building function");

    let user_id = request
        .user_id
        .ok_or_else(|| ApiError::bad_request("user id is required"))?;
    policy::create_building_for(&requester, user_id)?;

    let coordinate = request
        .building
        .ok_or_else(|| ApiError::bad_request(geometry::COORDINATE_FORMAT_ERROR))?;
    let point = geometry::parse_coordinate(&coordinate)?;

    debug!(
        "Creating building at ({}, {}) for user {}",
        point.y(),
        point.x(),
        user_id
    );

    let txn = state.db.begin().await?;
    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    let profile_model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("profile does not exist"))?;

    let now = Utc::now();
    let building_model = building::ActiveModel {
        longitude: Set(point.x()),
        latitude: Set(point.y()),
        rent: Set(request.rent),
        payment_details: Set(request.payment_details),
        county: Set(request.county),
        district: Set(request.district),
        comment: Set(request.comment),
        occupancy: Set(request.occupancy.unwrap_or(false)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    ledger::add_tie(&txn, profile_model.id, building_model.id, Relationship::Owner).await?;
    txn.commit().await?;

    info!(
        "Building created with ID: {} for owner {}",
        building_model.id, user_id
    );
    Ok((
        StatusCode::CREATED,
        Json(BuildingResponse::from(building_model)),
    ))
}

/// List all buildings (public)
#[utoipa::path(
    get,
    path = "/api/v1/buildings",
    tag = "buildings",
    params(
        ("format" = Option<String>, Query, description = "Set to geojson for a FeatureCollection"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated buildings or a FeatureCollection", body = Object)
    )
)]
#[instrument(skip(state))]
pub async fn get_buildings(
    State(state): State<AppState>,
    Query(query): Query<BuildingListQuery>,
) -> Result<Response, ApiError> {
    trace!("Entering get_buildings function");

    let buildings = Building::find()
        .order_by_asc(building::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} buildings from database", buildings.len());

    if query.format.as_deref() == Some("geojson") {
        let collection = geometry::feature_collection(&buildings);
        return Ok(Json(collection).into_response());
    }

    let responses: Vec<BuildingResponse> =
        buildings.into_iter().map(BuildingResponse::from).collect();
    let page_query = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let page = paginate(responses, &page_query, "/api/v1/buildings")?;
    Ok(Json(page).into_response())
}

/// Get a single building (public)
#[utoipa::path(
    get,
    path = "/api/v1/buildings/{building_id}",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
    ),
    responses(
        (status = 200, description = "Building retrieved", body = BuildingResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_building(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<BuildingResponse>, ApiError> {
    trace!("Entering get_building function for building_id: {}", building_id);

    let building_model = Building::find_by_id(building_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("building does not exist"))?;
    Ok(Json(BuildingResponse::from(building_model)))
}

/// Update a building (admin or owner)
#[utoipa::path(
    patch,
    path = "/api/v1/buildings/{building_id}",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
    ),
    request_body = UpdateBuildingRequest,
    responses(
        (status = 200, description = "Building updated", body = BuildingResponse),
        (status = 400, description = "Bad coordinate", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Requester is not an owner", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_building(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<UpdateBuildingRequest>,
) -> Result<Json<BuildingResponse>, ApiError> {
    trace!("Entering update_building function for building_id: {}", building_id);

    let txn = state.db.begin().await?;
    let building_model = Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("building does not exist"))?;

    let relationship = ledger::relationship_for(&txn, requester.id, building_id).await?;
    policy::modify_building(&requester, relationship)?;

    let mut building_active: building::ActiveModel = building_model.into();
    if let Some(coordinate) = request.building {
        let point = geometry::parse_coordinate(&coordinate)?;
        debug!(
            "Updating building {} coordinate to ({}, {})",
            building_id,
            point.y(),
            point.x()
        );
        building_active.longitude = Set(point.x());
        building_active.latitude = Set(point.y());
    }
    if let Some(rent) = request.rent {
        building_active.rent = Set(Some(rent));
    }
    if let Some(payment_details) = request.payment_details {
        building_active.payment_details = Set(Some(payment_details));
    }
    if let Some(county) = request.county {
        building_active.county = Set(Some(county));
    }
    if let Some(district) = request.district {
        building_active.district = Set(Some(district));
    }
    if let Some(comment) = request.comment {
        building_active.comment = Set(Some(comment));
    }
    if let Some(occupancy) = request.occupancy {
        building_active.occupancy = Set(occupancy);
    }
    building_active.updated_at = Set(Utc::now());

    let updated = building_active.update(&txn).await?;
    txn.commit().await?;
    info!("Building with ID {} updated successfully", building_id);
    Ok(Json(BuildingResponse::from(updated)))
}

/// Delete a building (admin or owner); refused while notices remain
#[utoipa::path(
    delete,
    path = "/api/v1/buildings/{building_id}",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
    ),
    responses(
        (status = 200, description = "Building deleted", body = DeleteBuildingResponse),
        (status = 403, description = "Requester is not an owner", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Unresolved notice", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_building(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<DeleteBuildingResponse>, ApiError> {
    trace!("Entering delete_building function for building_id: {}", building_id);

    let txn = state.db.begin().await?;
    Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("building does not exist"))?;

    let relationship = ledger::relationship_for(&txn, requester.id, building_id).await?;
    policy::modify_building(&requester, relationship)?;

    lifecycle::delete_building(&txn, building_id).await?;
    txn.commit().await?;

    Ok(Json(DeleteBuildingResponse {
        building_id,
        status: "successfully deleted".to_string(),
    }))
}

/// List the users tied to a building (admin or any linked profile)
#[utoipa::path(
    get,
    path = "/api/v1/buildings/{building_id}/users",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
        ("relationship" = Option<String>, Query, description = "Optional filter: owner or tenant"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 20)"),
    ),
    responses(
        (status = 200, description = "Paginated members", body = Object),
        (status = 403, description = "Profile not linked to building", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_building_users(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<BuildingMembersQuery>,
) -> Result<Json<Page<UserEnvelope>>, ApiError> {
    trace!("Entering get_building_users function for building_id: {}", building_id);

    Building::find_by_id(building_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Building does not exist"))?;

    let requester_relationship =
        ledger::relationship_for(&state.db, requester.id, building_id).await?;
    policy::view_building_scoped(&requester, requester_relationship)?;

    let filter = match query.relationship.as_deref() {
        Some(raw) => Some(Relationship::parse(raw).ok_or_else(|| {
            ApiError::bad_request("relationship must be either owner or tenant")
        })?),
        None => None,
    };

    let mut tie_query =
        UserBuilding::find().filter(user_building::Column::BuildingId.eq(building_id));
    if let Some(kind) = filter {
        tie_query = tie_query.filter(user_building::Column::Relationship.eq(kind));
    }
    let ties = tie_query.all(&state.db).await?;
    let profile_ids: Vec<i32> = ties.iter().map(|t| t.profile_id).collect();
    debug!(
        "Building {} has {} matching tie(s)",
        building_id,
        profile_ids.len()
    );

    let members = Profile::find()
        .filter(profile::Column::Id.is_in(profile_ids))
        .find_also_related(User)
        .order_by_asc(profile::Column::Id)
        .all(&state.db)
        .await?;

    let entries: Vec<UserEnvelope> = members
        .into_iter()
        .filter_map(|(profile_model, user_model)| {
            user_model.map(|u| UserEnvelope {
                user: UserWithProfile::new(u, Some(profile_model)),
            })
        })
        .collect();

    let page_query = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let page = paginate(
        entries,
        &page_query,
        &format!("/api/v1/buildings/{building_id}/users"),
    )?;
    Ok(Json(page))
}

/// Tie a user's profile to a building (admin or owner)
#[utoipa::path(
    patch,
    path = "/api/v1/buildings/{building_id}/users",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
    ),
    request_body = AddBuildingUserRequest,
    responses(
        (status = 200, description = "Profile linked", body = MessageResponse),
        (status = 400, description = "Missing fields or bad relationship", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Requester is not an owner", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building, user or profile not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Profile already linked", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn add_building_user(
    Path(building_id): Path<i32>,
    State(state): State<AppState>,
    requester: CurrentUser,
    Json(request): Json<AddBuildingUserRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering add_building_user function for building_id: {}", building_id);

    let txn = state.db.begin().await?;
    Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("building does not exist"))?;

    let requester_relationship =
        ledger::relationship_for(&txn, requester.id, building_id).await?;
    policy::manage_ledger(&requester, requester_relationship)?;

    let (Some(user_id), Some(relationship_raw)) = (request.user_id, request.relationship) else {
        warn!("add_building_user called without user_id or relationship");
        return Err(ApiError::bad_request(
            "must provide user id and relationship to building",
        ));
    };
    let relationship = Relationship::parse(&relationship_raw)
        .ok_or_else(|| ApiError::bad_request("relationship must be either owner or tenant"))?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("user does not exist"))?;
    let profile_model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("profile does not exist"))?;

    ledger::add_tie(&txn, profile_model.id, building_id, relationship).await?;
    txn.commit().await?;

    info!(
        "Profile of user {} linked to building {} as {}",
        user_id,
        building_id,
        relationship.as_str()
    );
    Ok(Json(MessageResponse {
        message: format!(
            "profile with user id {user_id} successfully added to building id {building_id}"
        ),
    }))
}

/// Remove a user's tie to a building (admin or owner); a building always
/// keeps at least one owner
#[utoipa::path(
    delete,
    path = "/api/v1/buildings/{building_id}/users/{user_id}",
    tag = "buildings",
    params(
        ("building_id" = i32, Path, description = "Building ID"),
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Tie removed", body = MessageResponse),
        (status = 403, description = "Requester is not an owner", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Building, profile or tie not found", body = crate::schemas::ErrorResponse),
        (status = 409, description = "Would remove the only owner", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn remove_building_user(
    Path((building_id, user_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!(
        "Entering remove_building_user function for building_id: {}, user_id: {}",
        building_id,
        user_id
    );

    let txn = state.db.begin().await?;
    Building::find_by_id(building_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("building does not exist"))?;

    let requester_relationship =
        ledger::relationship_for(&txn, requester.id, building_id).await?;
    policy::manage_ledger(&requester, requester_relationship)?;

    let profile_model = Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("user profile not linked to building"))?;

    ledger::remove_tie(&txn, profile_model.id, building_id).await?;
    txn.commit().await?;

    Ok(Json(MessageResponse {
        message: format!(
            "profile with user id {user_id} removed from building id {building_id}"
        ),
    }))
}
