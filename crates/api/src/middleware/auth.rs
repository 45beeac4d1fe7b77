use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use cineseat_db::PgPool;
use cineseat_engine::SeatEngine;
use cineseat_integrations::GatewayClient;
use cineseat_types::{AppConfig, AppError};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::response::ApiError;

/// Extractor for the authenticated user's id (required)
/// Usage: async fn handler(AuthUser(user_id): AuthUser)
pub struct AuthUser(pub Uuid);

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub engine: SeatEngine,
    pub gateway: GatewayClient,
    pub config: AppConfig,
    pub auth: AuthVerifier,
}

#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[allow(dead_code)]
    pub exp: usize,
}

/// HS256 bearer-token verifier with a shared secret.
#[derive(Clone)]
pub struct AuthVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                ApiError(AppError::Unauthorized(
                    "Missing or invalid Authorization header".into(),
                ))
            })?;

        let app_state = AppState::from_ref(state);

        // Verify JWT token
        let claims = app_state
            .auth
            .verify(bearer.token())
            .map_err(|e| ApiError(AppError::Unauthorized(format!("Invalid token: {e}"))))?;

        // Get user ID from claims
        let user_id: Uuid = claims
            .sub
            .parse()
            .map_err(|_| ApiError(AppError::Unauthorized("Invalid user ID in token".into())))?;

        Ok(AuthUser(user_id))
    }
}
