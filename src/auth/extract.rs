//! Request-identity extractor.
//!
//! Handlers that require authentication take a [`CurrentUser`] argument;
//! axum rejects the request with 401 before the handler body runs if the
//! bearer token is missing or does not verify. The user row is re-read on
//! every request so the admin flag is never trusted from the token.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use model::entities::user;
use sea_orm::EntityTrait;
use tracing::debug;

use crate::auth::jwt::TokenType;
use crate::error::ApiError;
use crate::schemas::AppState;

/// The authenticated requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("authentication required"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthenticated("authentication required"))?;

        let claims = state
            .jwt
            .verify(token, TokenType::Access)
            .map_err(|e| {
                debug!("Access token rejected: {}", e);
                ApiError::unauthenticated("invalid or expired token")
            })?;

        let user_model = user::Entity::find_by_id(claims.sub)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("invalid or expired token"))?;

        Ok(CurrentUser {
            id: user_model.id,
            username: user_model.username,
            is_admin: user_model.is_admin,
        })
    }
}
