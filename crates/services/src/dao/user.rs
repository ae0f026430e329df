use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shopsquad_db::models::{PasswordReset, User};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        email: String,
        username: String,
        display_name: String,
        password_hash: String,
    ) -> DaoResult<User> {
        let now = DateTime::now();
        let user = User {
            id: None,
            email,
            username,
            display_name,
            avatar: None,
            password_hash: Some(password_hash),
            is_admin: false,
            password_reset: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_username(&self, username: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "username": username, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: ObjectId,
        display_name: Option<String>,
        avatar: Option<String>,
    ) -> DaoResult<bool> {
        let mut update = bson::Document::new();
        if let Some(name) = display_name {
            update.insert("display_name", name);
        }
        if let Some(av) = avatar {
            update.insert("avatar", av);
        }

        if update.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(user_id, doc! { "$set": update })
            .await
    }

    pub async fn set_password_hash(
        &self,
        user_id: ObjectId,
        password_hash: String,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "password_hash": password_hash, "password_reset": null } },
            )
            .await
    }

    pub async fn set_password_reset(
        &self,
        user_id: ObjectId,
        reset: &PasswordReset,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                user_id,
                doc! { "$set": { "password_reset": bson::to_bson(reset)? } },
            )
            .await
    }

    /// Resolves an unexpired reset-token digest back to its user.
    pub async fn find_by_reset_digest(&self, digest: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! {
                "password_reset.token_hash": digest,
                "password_reset.expires_at": { "$gt": DateTime::now() },
                "deleted_at": null,
            })
            .await?
            .ok_or(DaoError::NotFound)
    }
}
