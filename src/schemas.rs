use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::auth::jwt::JwtSettings;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Token signing configuration
    pub jwt: JwtSettings,
}

/// Error response body: `{"error": "<message>"}` for every failure except
/// the structured weak-password detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable reason
    pub error: String,
}

/// Plain acknowledgement body for deletions and logout.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::auth::logout,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::get_user_buildings,
        crate::handlers::profiles::get_profile,
        crate::handlers::profiles::update_profile,
        crate::handlers::profiles::delete_profile,
        crate::handlers::buildings::create_building,
        crate::handlers::buildings::get_buildings,
        crate::handlers::buildings::get_building,
        crate::handlers::buildings::update_building,
        crate::handlers::buildings::delete_building,
        crate::handlers::buildings::get_building_users,
        crate::handlers::buildings::add_building_user,
        crate::handlers::buildings::remove_building_user,
        crate::handlers::notices::get_notices,
        crate::handlers::notices::create_notice,
        crate::handlers::notices::get_notice,
        crate::handlers::notices::update_notice,
        crate::handlers::notices::delete_notice,
        crate::handlers::notices::get_building_notices,
        crate::handlers::notices::get_user_notices,
        crate::handlers::comments::get_comments,
        crate::handlers::comments::create_comment,
        crate::handlers::comments::get_comment,
        crate::handlers::comments::update_comment,
        crate::handlers::comments::delete_comment,
        crate::handlers::comments::get_building_comments,
        crate::handlers::comments::get_user_comments,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            crate::pagination::PageQuery,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AccessTokenResponse,
            crate::handlers::users::UserResponse,
            crate::handlers::users::ProfileBody,
            crate::handlers::users::UserWithProfile,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::profiles::UpdateProfileRequest,
            crate::handlers::buildings::CreateBuildingRequest,
            crate::handlers::buildings::UpdateBuildingRequest,
            crate::handlers::buildings::BuildingResponse,
            crate::handlers::buildings::DeleteBuildingResponse,
            crate::handlers::buildings::AddBuildingUserRequest,
            crate::handlers::notices::CreateNoticeRequest,
            crate::handlers::notices::UpdateNoticeRequest,
            crate::handlers::notices::NoticeResponse,
            crate::handlers::comments::CreateCommentRequest,
            crate::handlers::comments::UpdateCommentRequest,
            crate::handlers::comments::CommentResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "users", description = "User accounts and profiles"),
        (name = "buildings", description = "Building registry and relationship ledger"),
        (name = "notices", description = "Owner-authored building notices"),
        (name = "comments", description = "Tenant-authored building comments"),
    ),
    info(
        title = "Rentals API",
        description = "Rental-property management backend: buildings, owners, tenants and building-scoped announcements",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
