use crate::handlers::{
    auth::{login, logout, refresh, register},
    buildings::{
        add_building_user, create_building, delete_building, get_building, get_building_users,
        get_buildings, remove_building_user, update_building,
    },
    comments::{
        create_comment, delete_comment, get_building_comments, get_comment, get_comments,
        get_user_comments, update_comment,
    },
    health::health_check,
    notices::{
        create_notice, delete_notice, get_building_notices, get_notice, get_notices,
        get_user_notices, update_notice,
    },
    profiles::{delete_profile, get_profile, update_profile},
    users::{delete_user, get_user, get_user_buildings, get_users, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Session routes
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/refresh", get(refresh))
        .route("/api/v1/auth/logout", get(logout))
        // User and profile routes
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", patch(update_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        .route("/api/v1/users/:user_id/profile", get(get_profile))
        .route("/api/v1/users/:user_id/profile", patch(update_profile))
        .route("/api/v1/users/:user_id/profile", delete(delete_profile))
        .route("/api/v1/users/:user_id/buildings", get(get_user_buildings))
        .route("/api/v1/users/:user_id/notices", get(get_user_notices))
        .route("/api/v1/users/:user_id/comments", get(get_user_comments))
        // Building registry and relationship ledger routes
        .route("/api/v1/buildings", post(create_building))
        .route("/api/v1/buildings", get(get_buildings))
        .route("/api/v1/buildings/:building_id", get(get_building))
        .route("/api/v1/buildings/:building_id", patch(update_building))
        .route("/api/v1/buildings/:building_id", delete(delete_building))
        .route("/api/v1/buildings/:building_id/users", get(get_building_users))
        .route("/api/v1/buildings/:building_id/users", patch(add_building_user))
        .route(
            "/api/v1/buildings/:building_id/users/:user_id",
            delete(remove_building_user),
        )
        .route(
            "/api/v1/buildings/:building_id/notices",
            get(get_building_notices),
        )
        .route(
            "/api/v1/buildings/:building_id/comments",
            get(get_building_comments),
        )
        // Announcement routes
        .route("/api/v1/notices", post(create_notice))
        .route("/api/v1/notices", get(get_notices))
        .route("/api/v1/notices/:notice_id", get(get_notice))
        .route("/api/v1/notices/:notice_id", patch(update_notice))
        .route("/api/v1/notices/:notice_id", delete(delete_notice))
        .route("/api/v1/comments", post(create_comment))
        .route("/api/v1/comments", get(get_comments))
        .route("/api/v1/comments/:comment_id", get(get_comment))
        .route("/api/v1/comments/:comment_id", patch(update_comment))
        .route("/api/v1/comments/:comment_id", delete(delete_comment))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
