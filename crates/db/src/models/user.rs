use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    /// Pending password-reset token, if one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset: Option<PasswordReset>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

/// Only the sha256 digest of the reset token is stored; the token itself
/// goes out by email and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub token_hash: String,
    pub expires_at: DateTime,
}

impl User {
    pub const COLLECTION: &'static str = "users";
}
