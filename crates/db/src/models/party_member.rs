use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Membership lookup row. "My parties" resolves through this collection
/// (user_id index, then `$in` on the party ids) instead of querying the
/// embedded participants array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub party_id: ObjectId,
    pub user_id: ObjectId,
    pub joined_at: DateTime,
}

impl PartyMember {
    pub const COLLECTION: &'static str = "party_members";
}
