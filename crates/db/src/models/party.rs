use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Aggregate root: a party owns its participants, products, payments and
/// chat messages as embedded arrays. Every mutation is a single-document
/// write; cross-party state does not exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub date: DateTime,
    pub location: Option<String>,
    pub organizer_id: ObjectId,
    pub organizer_name: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub status: PartyStatus,
    pub applied_coupon: Option<String>,
    /// Grand total snapshotted when payment collection starts. Later
    /// product changes do not move it.
    pub total_amount: Option<f64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
    /// Pre-coupon price, kept when a coupon overwrites `price`.
    pub original_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub selected_variant: Option<SelectedVariant>,
    pub added_by: ObjectId,
    pub added_by_name: String,
    pub added_at: DateTime,
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub reactions: Vec<ProductReaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedVariant {
    pub size: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Pending,
    Kept,
    Returned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReaction {
    pub user_id: ObjectId,
    pub user_name: String,
    pub reaction: ReactionKind,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub user_id: ObjectId,
    pub user_name: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    /// Provider order id when the payment went through PayPal; the manual
    /// reconciliation reference if the local write ever fails after capture.
    pub provider_order_id: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Preorder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender_id: ObjectId,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    #[default]
    Upcoming,
    InPayment,
    InPreorder,
    Trying,
    Finalizing,
    Completed,
}

impl PartyStatus {
    /// Legal edges: the forward chain one step at a time, plus the reopen
    /// back-edge from completed. Everything else is rejected.
    pub fn can_transition(self, to: PartyStatus) -> bool {
        use PartyStatus::*;
        matches!(
            (self, to),
            (Upcoming, InPayment)
                | (InPayment, InPreorder)
                | (InPreorder, Trying)
                | (Trying, Finalizing)
                | (Finalizing, Completed)
                | (Completed, Upcoming)
        )
    }
}

impl Party {
    pub const COLLECTION: &'static str = "parties";

    pub fn is_participant(&self, user_id: &ObjectId) -> bool {
        self.participants.iter().any(|p| p.id == *user_id)
    }

    pub fn participant_ids(&self) -> Vec<ObjectId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    pub fn payment_of(&self, user_id: &ObjectId) -> Option<&Payment> {
        self.payments.iter().find(|p| p.user_id == *user_id)
    }

    /// Joins and product changes close once the organizer has settled
    /// their own share.
    pub fn organizer_paid(&self) -> bool {
        self.payment_of(&self.organizer_id).is_some()
    }
}
