use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shopsquad_db::models::{CatalogDoc, CatalogProduct};

use super::base::{BaseDao, DaoResult};

pub struct CatalogDao {
    pub base: BaseDao<CatalogDoc>,
}

impl CatalogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, CatalogDoc::COLLECTION),
        }
    }

    /// A missing document is an empty catalog, not an error.
    pub async fn get(&self) -> DaoResult<Vec<CatalogProduct>> {
        Ok(self
            .base
            .find_one(doc! { "_id": CatalogDoc::DOC_ID })
            .await?
            .map(|d| d.items)
            .unwrap_or_default())
    }

    /// Wholesale replace; upsert on first import.
    pub async fn replace(
        &self,
        items: Vec<CatalogProduct>,
        admin_id: ObjectId,
    ) -> DaoResult<usize> {
        let count = items.len();
        let doc = CatalogDoc {
            id: CatalogDoc::DOC_ID.to_string(),
            items,
            updated_at: DateTime::now(),
            updated_by: Some(admin_id),
        };

        self.base
            .collection()
            .replace_one(doc! { "_id": CatalogDoc::DOC_ID }, &doc)
            .upsert(true)
            .await?;

        Ok(count)
    }

    pub async fn clear(&self, admin_id: ObjectId) -> DaoResult<()> {
        self.replace(Vec::new(), admin_id).await?;
        Ok(())
    }

    pub async fn find_product(&self, product_id: &str) -> DaoResult<Option<CatalogProduct>> {
        Ok(self
            .get()
            .await?
            .into_iter()
            .find(|p| p.id == product_id))
    }
}
