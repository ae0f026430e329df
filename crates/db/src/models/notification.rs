use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// One document per user, keyed by the user's id. Fan-out appends to
/// `items`; the list is unbounded and never pruned automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub items: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub party_id: Option<ObjectId>,
    pub requester_id: Option<ObjectId>,
    pub requester_name: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Invite,
    PaymentRequest,
    PaymentReceived,
    SquadClosed,
    SquadReopened,
    SquadCompleted,
    ReopenRequest,
}

impl NotificationDoc {
    pub const COLLECTION: &'static str = "notifications";
}
