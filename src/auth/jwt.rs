//! Access/refresh token issuance and verification (HS256).
//!
//! Tokens are stateless: the only server-side state is the user row looked
//! up on each authenticated request. A refresh token is never accepted
//! where an access token is expected, and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error, ErrorKind};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use model::entities::user;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    pub username: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued access + refresh pair. The refresh token travels only
/// in an HTTP-only cookie, never in a response body.
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signing configuration, shared through the application state.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    secret: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, access_secs: i64, refresh_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            access_lifetime: Duration::seconds(access_secs),
            refresh_lifetime: Duration::seconds(refresh_secs),
        }
    }

    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "insecure-dev-secret".to_string());
        let access_secs = std::env::var("ACCESS_TOKEN_LIFETIME_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);
        let refresh_secs = std::env::var("REFRESH_TOKEN_LIFETIME_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);
        Self::new(secret, access_secs, refresh_secs)
    }

    pub fn issue(&self, user: &user::Model, token_type: TokenType) -> Result<String, Error> {
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            token_type: token_type.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn issue_pair(&self, user: &user::Model) -> Result<TokenPair, Error> {
        Ok(TokenPair {
            access: self.issue(user, TokenType::Access)?,
            refresh: self.issue(user, TokenType::Refresh)?,
        })
    }

    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        if data.claims.token_type != expected.as_str() {
            return Err(ErrorKind::InvalidToken.into());
        }
        Ok(data.claims)
    }
}
