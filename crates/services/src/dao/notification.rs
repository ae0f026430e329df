use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shopsquad_db::models::{Notification, NotificationDoc, NotificationKind};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct NotificationDao {
    pub base: BaseDao<NotificationDoc>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, NotificationDoc::COLLECTION),
        }
    }

    /// Appends to the recipient's document, creating it on first delivery.
    /// Pure append: identical calls produce distinct records.
    #[allow(clippy::too_many_arguments)]
    pub async fn notify(
        &self,
        recipient: ObjectId,
        kind: NotificationKind,
        title: String,
        message: String,
        party_id: Option<ObjectId>,
        requester_id: Option<ObjectId>,
        requester_name: Option<String>,
    ) -> DaoResult<Notification> {
        let notification = Notification {
            id: nanoid::nanoid!(),
            kind,
            title,
            message,
            read: false,
            party_id,
            requester_id,
            requester_name,
            created_at: DateTime::now(),
        };

        self.base
            .collection()
            .update_one(
                doc! { "_id": recipient },
                doc! { "$push": { "items": bson::to_bson(&notification)? } },
            )
            .upsert(true)
            .await?;

        Ok(notification)
    }

    /// Newest first; a user with no document has no notifications.
    pub async fn list(&self, user_id: ObjectId) -> DaoResult<Vec<Notification>> {
        let mut items = self
            .base
            .find_one(doc! { "_id": user_id })
            .await?
            .map(|d| d.items)
            .unwrap_or_default();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Unknown ids are NotFound; re-marking an already-read item is a
    /// harmless no-op.
    pub async fn mark_read(&self, user_id: ObjectId, notification_id: &str) -> DaoResult<()> {
        let result = self
            .base
            .collection()
            .update_one(
                doc! { "_id": user_id, "items.id": notification_id },
                doc! { "$set": { "items.$[n].read": true } },
            )
            .array_filters(vec![doc! { "n.id": notification_id }])
            .await?;

        if result.matched_count == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "items.$[].read": true } },
            )
            .await?;
        Ok(())
    }

    pub async fn clear(&self, user_id: ObjectId) -> DaoResult<()> {
        self.base
            .collection()
            .update_one(doc! { "_id": user_id }, doc! { "$set": { "items": [] } })
            .await?;
        Ok(())
    }
}
