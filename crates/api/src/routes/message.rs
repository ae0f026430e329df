use axum::{Json, extract::{Path, State}, http::StatusCode};
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState, ws::dispatcher};
use crate::routes::party::{MessageResponse, message_response, parse_party_id};

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub text: String,
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(party_id): Path<String>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let pid = parse_party_id(&party_id)?;
    let user = state.users.base.find_by_id(auth.user_id).await?;
    let (party, message) = state.parties.add_message(pid, &user, body.text).await?;

    dispatcher::party_updated(&state.ws_storage, &party).await;
    Ok((StatusCode::CREATED, Json(message_response(&message))))
}
