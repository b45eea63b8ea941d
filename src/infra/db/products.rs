use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{CreateProductParams, ProductsRepo, RepoError, UpdateProductParams},
    domain::entities::ProductRecord,
};

use super::{PostgresRepositories, map_sqlx_error, util::decode_json};

const PRODUCT_COLUMNS: &str = "id, title, description, images, attributes, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    description: String,
    images: Value,
    attributes: Value,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<ProductRow> for ProductRecord {
    type Error = RepoError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            images: decode_json("images", row.images)?,
            attributes: decode_json("attributes", row.attributes)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<ProductRow>) -> Result<Vec<ProductRecord>, RepoError> {
    rows.into_iter().map(ProductRecord::try_from).collect()
}

#[async_trait]
impl ProductsRepo for PostgresRepositories {
    async fn insert(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError> {
        let sql = format!(
            "INSERT INTO products (id, title, description, images, attributes) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(params.id)
            .bind(params.title)
            .bind(params.description)
            .bind(Json(params.images))
            .bind(Json(params.attributes))
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        ProductRecord::try_from(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ProductRecord::try_from).transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductRecord>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn update(
        &self,
        params: UpdateProductParams,
    ) -> Result<Option<ProductRecord>, RepoError> {
        let sql = format!(
            "UPDATE products SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                images = COALESCE($4, images), \
                attributes = COALESCE($5, attributes), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(params.id)
            .bind(params.title)
            .bind(params.description)
            .bind(params.images.map(Json))
            .bind(params.attributes.map(Json))
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(ProductRecord::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_newest_first(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }
}
