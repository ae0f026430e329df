use axum::{Json, extract::{Path, State}};
use bson::oid::ObjectId;
use serde::Serialize;
use tracing::warn;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState, ws::dispatcher};
use shopsquad_db::models::{Notification, NotificationKind};

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub party_id: Option<String>,
    pub requester_id: Option<String>,
    pub requester_name: Option<String>,
    pub created_at: String,
}

fn to_response(n: &Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id.clone(),
        kind: n.kind,
        title: n.title.clone(),
        message: n.message.clone(),
        read: n.read,
        party_id: n.party_id.map(|id| id.to_hex()),
        requester_id: n.requester_id.map(|id| id.to_hex()),
        requester_name: n.requester_name.clone(),
        created_at: n.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

/// Stores the notification and pushes it to the recipient's live
/// connections. Storage failure is logged, never propagated; a lost
/// notification must not fail the mutation that caused it.
#[allow(clippy::too_many_arguments)]
pub async fn deliver(
    state: &AppState,
    recipient: ObjectId,
    kind: NotificationKind,
    title: String,
    message: String,
    party_id: Option<ObjectId>,
    requester_id: Option<ObjectId>,
    requester_name: Option<String>,
) {
    match state
        .notifications
        .notify(recipient, kind, title, message, party_id, requester_id, requester_name)
        .await
    {
        Ok(notification) => {
            dispatcher::notification_new(&state.ws_storage, &recipient, &notification).await;
        }
        Err(e) => warn!(%recipient, %e, "Failed to store notification"),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let items = state.notifications.list(auth.user_id).await?;
    Ok(Json(items.iter().map(to_response).collect()))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .notifications
        .mark_read(auth.user_id, &notification_id)
        .await?;
    Ok(Json(serde_json::json!({ "read": true })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.mark_all_read(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "read": true })))
}

pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.clear(auth.user_id).await?;
    Ok(Json(serde_json::json!({ "cleared": true })))
}
