use bson::oid::ObjectId;
use serde::Serialize;
use shopsquad_db::models::{Participant, Product};

/// What one participant owes: the sum of the prices of the products they
/// added. Nothing is split evenly; you pay for what you put in the cart.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantShare {
    pub user_id: ObjectId,
    pub name: String,
    pub amount: f64,
    pub product_count: usize,
}

pub fn compute_shares(products: &[Product], participants: &[Participant]) -> Vec<ParticipantShare> {
    participants
        .iter()
        .map(|participant| {
            let mine: Vec<&Product> = products
                .iter()
                .filter(|p| p.added_by == participant.id)
                .collect();
            ParticipantShare {
                user_id: participant.id,
                name: participant.name.clone(),
                amount: mine.iter().map(|p| p.price).sum(),
                product_count: mine.len(),
            }
        })
        .collect()
}

/// Sum of every product price, whether or not its adder is still a
/// participant. Snapshotted into the party when payment collection starts.
pub fn grand_total(products: &[Product]) -> f64 {
    products.iter().map(|p| p.price).sum()
}

pub fn share_of(products: &[Product], user_id: &ObjectId) -> f64 {
    products
        .iter()
        .filter(|p| p.added_by == *user_id)
        .map(|p| p.price)
        .sum()
}
