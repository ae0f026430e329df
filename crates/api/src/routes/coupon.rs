use axum::{Json, extract::{Path, State}};
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState, ws::dispatcher};
use crate::routes::party::{PartyResponse, parse_party_id, to_response};

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<ApplyCouponRequest>,
) -> Result<Json<PartyResponse>, ApiError> {
    let pid = parse_party_id(&party_id)?;
    let party = state
        .parties
        .apply_coupon(pid, &auth.user_id, &body.code)
        .await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok(Json(to_response(&party)))
}
