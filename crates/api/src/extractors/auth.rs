use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use bson::oid::ObjectId;
use shopsquad_services::auth::Claims;

use crate::{error::ApiError, state::AppState};

/// The authenticated caller. Handlers key every permission check off
/// `user_id`; the raw claims ride along for the few places that need
/// token metadata.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
    pub claims: Claims,
}

/// Bearer header first, `access_token` cookie as the fallback for
/// browser clients.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(bearer) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix("access_token=")
                .map(str::to_string)
        })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = app_state.auth.verify_access_token(&token)?;
        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser { user_id, claims })
    }
}
