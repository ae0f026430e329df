use axum::{Json, extract::{Path, State}};
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState, ws::dispatcher};
use crate::routes::party::{PartyResponse, parse_party_id, to_response};
use shopsquad_db::models::{ProductStatus, ReactionKind, SelectedVariant};
use shopsquad_services::dao::party::NewProduct;

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    /// Copy fields from this catalog entry when set.
    pub catalog_id: Option<String>,
    pub title: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub selected_variant: Option<SelectedVariant>,
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<AddProductRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let user = state.users.base.find_by_id(auth.user_id).await?;

    // Catalog adds copy the entry's fields; the party never references the
    // catalog afterwards.
    let new = if let Some(ref catalog_id) = body.catalog_id {
        let entry = state
            .catalog
            .find_product(catalog_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Catalog product not found".to_string()))?;
        let variant = body.selected_variant.clone();
        let price = entry.variant_price(
            variant.as_ref().and_then(|v| v.size.as_deref()),
            variant.as_ref().and_then(|v| v.color.as_deref()),
        );
        NewProduct {
            title: entry.title,
            price,
            images: entry.images,
            description: entry.body,
            vendor: entry.vendor,
            product_type: entry.product_type,
            selected_variant: variant,
        }
    } else {
        let title = body
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;
        let price = body
            .price
            .filter(|p| *p >= 0.0)
            .ok_or_else(|| ApiError::Validation("A non-negative price is required".to_string()))?;
        NewProduct {
            title,
            price,
            images: body.images,
            description: body.description,
            vendor: body.vendor,
            product_type: body.product_type,
            selected_variant: body.selected_variant,
        }
    };

    let party = state.parties.add_product(pid, &user, new).await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((party_id, product_id)): Path<(String, String)>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state
        .parties
        .remove_product(pid, &auth.user_id, &product_id)
        .await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

#[derive(Debug, Deserialize)]
pub struct SetProductStatusRequest {
    pub status: ProductStatus,
}

pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((party_id, product_id)): Path<(String, String)>,
    Json(body): Json<SetProductStatusRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state
        .parties
        .set_product_status(pid, &auth.user_id, &product_id, body.status)
        .await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub reaction: ReactionKind,
}

pub async fn react(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((party_id, product_id)): Path<(String, String)>,
    Json(body): Json<ReactionRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let party = state
        .parties
        .toggle_reaction(pid, &user, &product_id, body.reaction)
        .await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}
