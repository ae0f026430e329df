use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use shopsquad_db::models::{Notification, Party};
use tracing::{debug, warn};

use super::storage::WsStorage;

/// Sends a JSON message to every connection of the given users.
pub async fn broadcast(
    ws_storage: &WsStorage,
    user_ids: &[ObjectId],
    message: &serde_json::Value,
) {
    let text = serde_json::to_string(message).unwrap_or_default();

    for user_id in user_ids {
        let senders = ws_storage.get_senders(user_id);
        for sender in senders {
            let text = text.clone();
            let mut guard = sender.lock().await;
            if let Err(e) = guard.send(Message::text(text)).await {
                warn!(?user_id, %e, "Failed to send WS message");
            } else {
                debug!(?user_id, "WS message sent");
            }
        }
    }
}

pub async fn send_to_user(
    ws_storage: &WsStorage,
    user_id: &ObjectId,
    message: &serde_json::Value,
) {
    broadcast(ws_storage, &[*user_id], message).await;
}

/// Snapshot-style push: carries only the party id, consumers re-fetch.
pub async fn party_updated(ws_storage: &WsStorage, party: &Party) {
    let Some(party_id) = party.id else { return };
    let event = serde_json::json!({
        "type": "party:updated",
        "data": { "party_id": party_id.to_hex() },
    });
    broadcast(ws_storage, &party.participant_ids(), &event).await;
}

pub async fn notification_new(
    ws_storage: &WsStorage,
    user_id: &ObjectId,
    notification: &Notification,
) {
    let event = serde_json::json!({
        "type": "notification:new",
        "data": {
            "id": notification.id,
            "kind": notification.kind,
            "title": notification.title,
            "message": notification.message,
            "party_id": notification.party_id.map(|id| id.to_hex()),
        },
    });
    send_to_user(ws_storage, user_id, &event).await;
}
