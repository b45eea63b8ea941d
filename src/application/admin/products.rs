//! Product catalog service.

use std::sync::Arc;

use sitedesk_api_types::{Product, ProductDraft, ProductPatch};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CreateProductParams, ProductsRepo, RepoError, UpdateProductParams,
};
use crate::cache::{CacheTrigger, deps};
use crate::domain::products::{normalize_draft, normalize_patch};
use crate::domain::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum AdminProductError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("product not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminProductService {
    repo: Arc<dyn ProductsRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminProductService {
    pub fn new(repo: Arc<dyn ProductsRepo>) -> Self {
        Self {
            repo,
            cache_trigger: None,
        }
    }

    /// Set the cache trigger for this service; `None` disables invalidation.
    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product, AdminProductError> {
        let draft = normalize_draft(draft)?;
        let record = self
            .repo
            .insert(CreateProductParams {
                id: Uuid::new_v4(),
                title: draft.title,
                description: draft.description,
                images: draft.images,
                attributes: draft.attributes,
            })
            .await?;

        info!(product_id = %record.id, title = %record.title, "Product created");

        if let Some(trigger) = &self.cache_trigger {
            trigger.product_created(record.id).await;
        }

        Ok(record.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, AdminProductError> {
        deps::record(format!("/products/{id}"));
        deps::record(format!("/dashboard/products/{id}"));
        self.repo
            .find_by_id(id)
            .await?
            .map(Product::from)
            .ok_or(AdminProductError::NotFound)
    }

    /// Replace the supplied fields; absent fields keep their stored value.
    pub async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product, AdminProductError> {
        let patch = normalize_patch(patch)?;
        let fields = patch_fields(&patch);
        let record = self
            .repo
            .update(UpdateProductParams {
                id,
                title: patch.title,
                description: patch.description,
                images: patch.images,
                attributes: patch.attributes,
            })
            .await?
            .ok_or(AdminProductError::NotFound)?;

        info!(product_id = %id, fields = ?fields, "Product updated");

        if let Some(trigger) = &self.cache_trigger {
            trigger.product_updated(id).await;
        }

        Ok(record.into())
    }

    /// Delete a product. Homepage references to it are left in place.
    pub async fn delete(&self, id: Uuid) -> Result<(), AdminProductError> {
        if !self.repo.delete(id).await? {
            return Err(AdminProductError::NotFound);
        }

        info!(product_id = %id, "Product deleted");

        if let Some(trigger) = &self.cache_trigger {
            trigger.product_deleted(id).await;
        }

        Ok(())
    }

    /// All products, newest first.
    pub async fn list(&self) -> Result<Vec<Product>, AdminProductError> {
        deps::record("/products");
        deps::record("/dashboard/products");
        Ok(self
            .repo
            .list_newest_first()
            .await?
            .into_iter()
            .map(Product::from)
            .collect())
    }
}

fn patch_fields(patch: &ProductPatch) -> Vec<&'static str> {
    [
        ("title", patch.title.is_some()),
        ("description", patch.description.is_some()),
        ("images", patch.images.is_some()),
        ("attributes", patch.attributes.is_some()),
    ]
    .into_iter()
    .filter_map(|(name, present)| present.then_some(name))
    .collect()
}
