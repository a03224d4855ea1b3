use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use model::entities::{profile, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

use crate::auth::jwt::TokenType;
use crate::auth::password::{hash_password, policy_violations, verify_password};
use crate::error::ApiError;
use crate::handlers::users::UserResponse;
use crate::schemas::{AppState, MessageResponse};

const REFRESH_COOKIE: &str = "refresh_token";

/// Request body for registering a new account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Username (must be unique)
    pub username: Option<String>,
    /// Password (validated against the policy)
    pub password: Option<String>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Access token response; the refresh token travels in an HTTP-only cookie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Register a new user account. A profile row is created in the same
/// transaction.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Duplicate username or weak password", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    trace!("Entering register function");

    let username = request
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::bad_request("username is required"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    debug!("Registering user with username: {}", username);

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username.clone()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        warn!("Registration rejected, username '{}' taken", username);
        return Err(ApiError::bad_request("username already exists"));
    }

    let violations = policy_violations(&password);
    if !violations.is_empty() {
        debug!(
            "Registration rejected, password violates {} rule(s)",
            violations.len()
        );
        return Err(ApiError::WeakPassword(violations));
    }

    let password_hash = hash_password(&password)?;

    let txn = state.db.begin().await?;
    let user_model = user::ActiveModel {
        username: Set(username),
        password_hash: Set(password_hash),
        is_admin: Set(false),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    profile::ActiveModel {
        user_id: Set(user_model.id),
        phone: Set(None),
        address: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "User registered with ID: {}, username: {}",
        user_model.id, user_model.username
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(user_model))))
}

/// Exchange credentials for an access token and a refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AccessTokenResponse),
        (status = 400, description = "Invalid credentials", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(request, jar))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), ApiError> {
    trace!("Entering login function");

    let username = request
        .username
        .ok_or_else(|| ApiError::bad_request("username is required"))?;
    let password = request
        .password
        .ok_or_else(|| ApiError::bad_request("password is required"))?;

    debug!("Login attempt for username: {}", username);

    // Unknown username and wrong password produce the same error so the
    // response does not reveal which one failed.
    let user_model = user::Entity::find()
        .filter(user::Column::Username.eq(username.clone()))
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Login failed for '{}': unknown username", username);
            ApiError::bad_request("invalid login credentials")
        })?;

    if !verify_password(&password, &user_model.password_hash) {
        warn!("Login failed for '{}': password mismatch", username);
        return Err(ApiError::bad_request("invalid login credentials"));
    }

    let pair = state
        .jwt
        .issue_pair(&user_model)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to issue tokens: {e}")))?;

    info!("User '{}' logged in", user_model.username);

    let cookie = Cookie::build((REFRESH_COOKIE, pair.refresh))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build();

    Ok((jar.add(cookie), Json(AccessTokenResponse { access: pair.access })))
}

/// Mint a fresh access token from the refresh cookie.
#[utoipa::path(
    get,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 400, description = "Refresh cookie missing", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Refresh token invalid or expired", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    trace!("Entering refresh function");

    let cookie = jar
        .get(REFRESH_COOKIE)
        .ok_or_else(|| ApiError::bad_request("refresh token required"))?;

    let claims = state
        .jwt
        .verify(cookie.value(), TokenType::Refresh)
        .map_err(|e| {
            debug!("Refresh token rejected: {}", e);
            ApiError::forbidden("invalid or expired token")
        })?;

    let user_model = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::forbidden("invalid or expired token"))?;

    let access = state
        .jwt
        .issue(&user_model, TokenType::Access)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("failed to issue token: {e}")))?;

    debug!("Access token refreshed for user {}", user_model.id);
    Ok(Json(AccessTokenResponse { access }))
}

/// Drop the refresh cookie.
#[utoipa::path(
    get,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    trace!("Entering logout function");
    let removal = Cookie::build((REFRESH_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(MessageResponse {
            message: "successfully logged out".to_string(),
        }),
    )
}
