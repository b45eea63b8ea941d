//! Domain entities mirrored from persistent storage.

use serde_json::Value;
use sitedesk_api_types::{MediaReference, Product, ProductAttribute, SingletonKind};
use time::OffsetDateTime;
use uuid::Uuid;

/// The stored row of a singleton kind. `body` holds only the fields that
/// have been written; readers fill the rest with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SingletonRecord {
    pub kind: SingletonKind,
    pub body: Value,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub images: Vec<MediaReference>,
    pub attributes: Vec<ProductAttribute>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            title: record.title,
            description: record.description,
            images: record.images,
            attributes: record.attributes,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
