use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shopsquad_db::models::{
    ChatMessage, Participant, Party, PartyMember, PartyStatus, Payment, PaymentStatus,
    PaymentType, Product, ProductReaction, ProductStatus, ReactionKind, SelectedVariant, User,
};
use tracing::debug;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::{coupon, shares};

/// Fields a participant supplies when putting a product in the cart,
/// typically copied out of a catalog entry.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub price: f64,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub selected_variant: Option<SelectedVariant>,
}

pub struct PartyDao {
    pub base: BaseDao<Party>,
    pub members: BaseDao<PartyMember>,
}

impl PartyDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Party::COLLECTION),
            members: BaseDao::new(db, PartyMember::COLLECTION),
        }
    }

    fn participant_from(user: &User) -> DaoResult<Participant> {
        let id = user.id.ok_or(DaoError::NotFound)?;
        Ok(Participant {
            id,
            name: user.display_name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        })
    }

    pub async fn create(
        &self,
        title: String,
        date: DateTime,
        location: Option<String>,
        organizer: &User,
    ) -> DaoResult<Party> {
        let me = Self::participant_from(organizer)?;
        let now = DateTime::now();
        let party = Party {
            id: None,
            title,
            date,
            location,
            organizer_id: me.id,
            organizer_name: me.name.clone(),
            participants: vec![me.clone()],
            products: Vec::new(),
            payments: Vec::new(),
            messages: Vec::new(),
            status: PartyStatus::Upcoming,
            applied_coupon: None,
            total_amount: None,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&party).await?;
        self.insert_member(id, me.id).await?;
        self.base.find_by_id(id).await
    }

    async fn insert_member(&self, party_id: ObjectId, user_id: ObjectId) -> DaoResult<()> {
        let member = PartyMember {
            id: None,
            party_id,
            user_id,
            joined_at: DateTime::now(),
        };
        match self.members.insert_one(&member).await {
            Ok(_) => Ok(()),
            // Already a member; the unique index is the source of truth.
            Err(DaoError::DuplicateKey(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// "My parties" goes through the membership rows, then `$in` on the
    /// party ids. Newest date first.
    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Party>> {
        let memberships = self
            .members
            .find_many(doc! { "user_id": user_id }, None)
            .await?;
        let party_ids: Vec<ObjectId> = memberships.iter().map(|m| m.party_id).collect();

        self.base
            .find_many(
                doc! { "_id": { "$in": party_ids } },
                Some(doc! { "date": -1 }),
            )
            .await
    }

    pub async fn get_for_participant(
        &self,
        party_id: ObjectId,
        user_id: &ObjectId,
    ) -> DaoResult<Party> {
        let party = self.base.find_by_id(party_id).await?;
        if !party.is_participant(user_id) {
            return Err(DaoError::Forbidden(
                "Only participants can access this squad".to_string(),
            ));
        }
        Ok(party)
    }

    fn ensure_open_for_changes(party: &Party) -> DaoResult<()> {
        if party.organizer_paid() {
            return Err(DaoError::Forbidden(
                "The organizer has completed payment; the cart is locked".to_string(),
            ));
        }
        if !matches!(party.status, PartyStatus::Upcoming | PartyStatus::InPayment) {
            return Err(DaoError::Validation(format!(
                "Squad is not open for changes in status {:?}",
                party.status
            )));
        }
        Ok(())
    }

    pub async fn join(&self, party_id: ObjectId, user: &User) -> DaoResult<Party> {
        let party = self.base.find_by_id(party_id).await?;
        let me = Self::participant_from(user)?;

        if party.is_participant(&me.id) {
            return Ok(party);
        }
        Self::ensure_open_for_changes(&party)?;

        self.base
            .update_one(
                doc! { "_id": party_id, "participants.id": { "$ne": me.id } },
                doc! { "$push": { "participants": bson::to_bson(&me)? } },
            )
            .await?;
        self.insert_member(party_id, me.id).await?;

        debug!(%party_id, user_id = %me.id, "Joined party");
        self.base.find_by_id(party_id).await
    }

    pub async fn add_product(
        &self,
        party_id: ObjectId,
        user: &User,
        new: NewProduct,
    ) -> DaoResult<Party> {
        let user_id = user.id.ok_or(DaoError::NotFound)?;
        let party = self.get_for_participant(party_id, &user_id).await?;
        Self::ensure_open_for_changes(&party)?;

        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            price: new.price,
            original_price: None,
            images: new.images,
            description: new.description,
            vendor: new.vendor,
            product_type: new.product_type,
            selected_variant: new.selected_variant,
            added_by: user_id,
            added_by_name: user.display_name.clone(),
            added_at: DateTime::now(),
            status: None,
            reactions: Vec::new(),
        };

        self.base
            .update_by_id(
                party_id,
                doc! { "$push": { "products": bson::to_bson(&product)? } },
            )
            .await?;
        self.base.find_by_id(party_id).await
    }

    /// Only the product's adder or the organizer may remove it.
    pub async fn remove_product(
        &self,
        party_id: ObjectId,
        user_id: &ObjectId,
        product_id: &str,
    ) -> DaoResult<Party> {
        let party = self.get_for_participant(party_id, user_id).await?;
        Self::ensure_open_for_changes(&party)?;

        let product = party
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(DaoError::NotFound)?;
        if product.added_by != *user_id && party.organizer_id != *user_id {
            return Err(DaoError::Forbidden(
                "Only the person who added a product (or the organizer) can remove it"
                    .to_string(),
            ));
        }

        self.base
            .update_by_id(
                party_id,
                doc! { "$pull": { "products": { "id": product_id } } },
            )
            .await?;
        self.base.find_by_id(party_id).await
    }

    /// Kept/returned bookkeeping during the trying phase, organizer only.
    pub async fn set_product_status(
        &self,
        party_id: ObjectId,
        user_id: &ObjectId,
        product_id: &str,
        status: ProductStatus,
    ) -> DaoResult<Party> {
        let party = self.get_for_participant(party_id, user_id).await?;
        if party.organizer_id != *user_id {
            return Err(DaoError::Forbidden(
                "Only the organizer can mark products kept or returned".to_string(),
            ));
        }
        if party.status != PartyStatus::Trying {
            return Err(DaoError::Validation(
                "Products are marked kept or returned during the trying phase".to_string(),
            ));
        }

        let result = self
            .base
            .collection()
            .update_one(
                doc! { "_id": party_id },
                doc! { "$set": {
                    "products.$[p].status": bson::to_bson(&status)?,
                    "updated_at": DateTime::now(),
                } },
            )
            .array_filters(vec![doc! { "p.id": product_id }])
            .await?;
        if result.modified_count == 0 {
            return Err(DaoError::NotFound);
        }

        self.base.find_by_id(party_id).await
    }

    /// One reaction per user per product: same kind toggles off, the other
    /// kind replaces. No history.
    pub async fn toggle_reaction(
        &self,
        party_id: ObjectId,
        user: &User,
        product_id: &str,
        kind: ReactionKind,
    ) -> DaoResult<Party> {
        let user_id = user.id.ok_or(DaoError::NotFound)?;
        let party = self.get_for_participant(party_id, &user_id).await?;

        let product = party
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(DaoError::NotFound)?;

        let mut reactions: Vec<ProductReaction> = product
            .reactions
            .iter()
            .filter(|r| r.user_id != user_id)
            .cloned()
            .collect();

        let existing = product.reactions.iter().find(|r| r.user_id == user_id);
        if existing.map(|r| r.reaction) != Some(kind) {
            reactions.push(ProductReaction {
                user_id,
                user_name: user.display_name.clone(),
                reaction: kind,
                created_at: DateTime::now(),
            });
        }

        self.base
            .collection()
            .update_one(
                doc! { "_id": party_id },
                doc! { "$set": {
                    "products.$[p].reactions": bson::to_bson(&reactions)?,
                    "updated_at": DateTime::now(),
                } },
            )
            .array_filters(vec![doc! { "p.id": product_id }])
            .await?;

        self.base.find_by_id(party_id).await
    }

    pub async fn add_message(
        &self,
        party_id: ObjectId,
        user: &User,
        text: String,
    ) -> DaoResult<(Party, ChatMessage)> {
        let user_id = user.id.ok_or(DaoError::NotFound)?;
        self.get_for_participant(party_id, &user_id).await?;

        if text.trim().is_empty() {
            return Err(DaoError::Validation("Message text is required".to_string()));
        }

        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            sender_id: user_id,
            sender_name: user.display_name.clone(),
            sender_avatar: user.avatar.clone(),
            created_at: DateTime::now(),
        };

        self.base
            .update_by_id(
                party_id,
                doc! { "$push": { "messages": bson::to_bson(&message)? } },
            )
            .await?;

        let party = self.base.find_by_id(party_id).await?;
        Ok((party, message))
    }

    /// Overwrites every product price with the coupon's fixed value and
    /// remembers the old one. A coupon can be applied once, ever.
    pub async fn apply_coupon(
        &self,
        party_id: ObjectId,
        user_id: &ObjectId,
        code: &str,
    ) -> DaoResult<Party> {
        let party = self.get_for_participant(party_id, user_id).await?;

        if party.organizer_id != *user_id {
            return Err(DaoError::Forbidden(
                "Only the organizer can apply a coupon".to_string(),
            ));
        }
        if party.applied_coupon.is_some() {
            return Err(DaoError::Validation(
                "A coupon has already been applied to this squad".to_string(),
            ));
        }
        if !matches!(party.status, PartyStatus::Upcoming | PartyStatus::InPayment) {
            return Err(DaoError::Validation(
                "Coupons only apply before preordering starts".to_string(),
            ));
        }
        let price = coupon::lookup(code)
            .ok_or_else(|| DaoError::Validation(format!("Unknown coupon code: {code}")))?;

        let products: Vec<Product> = party
            .products
            .iter()
            .map(|p| {
                let mut p = p.clone();
                p.original_price = Some(p.price);
                p.price = price;
                p
            })
            .collect();

        self.base
            .update_by_id(
                party_id,
                doc! { "$set": {
                    "products": bson::to_bson(&products)?,
                    "applied_coupon": code.trim().to_uppercase(),
                } },
            )
            .await?;
        self.base.find_by_id(party_id).await
    }

    /// Organizer-driven status change, validated by the state machine.
    /// Entering in_payment snapshots the grand total.
    pub async fn set_status(
        &self,
        party_id: ObjectId,
        user_id: &ObjectId,
        to: PartyStatus,
    ) -> DaoResult<Party> {
        let party = self.get_for_participant(party_id, user_id).await?;

        if party.organizer_id != *user_id {
            return Err(DaoError::Forbidden(
                "Only the organizer can change the squad status".to_string(),
            ));
        }
        if !party.status.can_transition(to) {
            return Err(DaoError::Validation(format!(
                "Cannot move from {:?} to {:?}",
                party.status, to
            )));
        }

        let mut set = doc! { "status": bson::to_bson(&to)? };
        if to == PartyStatus::InPayment {
            set.insert("total_amount", shares::grand_total(&party.products));
        }

        self.base
            .update_by_id(party_id, doc! { "$set": set })
            .await?;
        self.base.find_by_id(party_id).await
    }

    /// Embeds a completed payment. The filter refuses a second payment from
    /// the same user atomically.
    pub async fn record_payment(
        &self,
        party_id: ObjectId,
        user: &User,
        amount: f64,
        provider_order_id: Option<String>,
    ) -> DaoResult<Party> {
        let user_id = user.id.ok_or(DaoError::NotFound)?;
        let party = self.get_for_participant(party_id, &user_id).await?;

        if party.status != PartyStatus::InPayment {
            return Err(DaoError::Validation(
                "The squad is not collecting payments".to_string(),
            ));
        }
        if party.payment_of(&user_id).is_some() {
            return Err(DaoError::Validation(
                "You have already paid your share".to_string(),
            ));
        }

        let payment = Payment {
            user_id,
            user_name: user.display_name.clone(),
            amount,
            status: PaymentStatus::Completed,
            payment_type: PaymentType::Preorder,
            provider_order_id,
            created_at: DateTime::now(),
        };

        let updated = self
            .base
            .update_one(
                doc! { "_id": party_id, "payments.user_id": { "$ne": user_id } },
                doc! { "$push": { "payments": bson::to_bson(&payment)? } },
            )
            .await?;
        if !updated {
            return Err(DaoError::Validation(
                "You have already paid your share".to_string(),
            ));
        }

        self.base.find_by_id(party_id).await
    }

    /// Everyone has paid once each participant has a payment on record.
    pub fn all_paid(party: &Party) -> bool {
        party
            .participants
            .iter()
            .all(|p| party.payment_of(&p.id).is_some())
    }

    /// The auto-complete policy jump. Bypasses `can_transition` on purpose:
    /// the last payment landing is the completion event.
    pub async fn auto_complete(&self, party_id: ObjectId) -> DaoResult<Party> {
        self.base
            .update_one(
                doc! { "_id": party_id, "status": bson::to_bson(&PartyStatus::InPayment)? },
                doc! { "$set": { "status": bson::to_bson(&PartyStatus::Completed)? } },
            )
            .await?;
        self.base.find_by_id(party_id).await
    }
}
