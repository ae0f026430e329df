use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// The whole catalog lives in one well-known document and is replaced
/// wholesale on admin imports; there is no per-item update path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDoc {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<CatalogProduct>,
    pub updated_at: DateTime,
    pub updated_by: Option<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub base_price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub variants: Vec<CatalogVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub size: Option<String>,
    pub color: Option<String>,
    /// Falls back to the product's base_price when absent.
    pub price: Option<f64>,
}

impl CatalogDoc {
    pub const COLLECTION: &'static str = "catalog";
    pub const DOC_ID: &'static str = "products";
}

impl CatalogProduct {
    pub fn variant_price(&self, size: Option<&str>, color: Option<&str>) -> f64 {
        self.variants
            .iter()
            .find(|v| v.size.as_deref() == size && v.color.as_deref() == color)
            .and_then(|v| v.price)
            .unwrap_or(self.base_price)
    }
}
