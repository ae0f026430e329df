use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use shopsquad_db::models::CatalogProduct;

async fn require_admin(state: &AppState, auth: &AuthUser) -> Result<(), ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    if !user.is_admin {
        return Err(ApiError::Forbidden(
            "Only admins can manage the catalog".to_string(),
        ));
    }
    Ok(())
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<CatalogProduct>>, ApiError> {
    Ok(Json(state.catalog.get().await?))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceCatalogRequest {
    pub items: Vec<CatalogProduct>,
}

#[derive(Debug, Serialize)]
pub struct ReplaceCatalogResponse {
    pub count: usize,
}

pub async fn replace(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ReplaceCatalogRequest>,
) -> Result<Json<ReplaceCatalogResponse>, ApiError> {
    require_admin(&state, &auth).await?;
    let count = state.catalog.replace(body.items, auth.user_id).await?;
    Ok(Json(ReplaceCatalogResponse { count }))
}

pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &auth).await?;
    state.catalog.clear(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}
