//! Singleton document service: load, merge-upsert and reset.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use sitedesk_api_types::{HomePage, Product, SingletonKind, StoredDocument};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::repos::{ProductsRepo, RepoError, SingletonRepo};
use crate::cache::{CacheTrigger, deps};
use crate::domain::documents::{SingletonDocument, from_stored, prepare_patch};
use crate::domain::entities::SingletonRecord;
use crate::domain::error::DomainError;
use crate::domain::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum AdminContentError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminContentService {
    singletons: Arc<dyn SingletonRepo>,
    products: Arc<dyn ProductsRepo>,
    cache_trigger: Option<Arc<CacheTrigger>>,
}

impl AdminContentService {
    pub fn new(singletons: Arc<dyn SingletonRepo>, products: Arc<dyn ProductsRepo>) -> Self {
        Self {
            singletons,
            products,
            cache_trigger: None,
        }
    }

    /// Set the cache trigger for this service; `None` disables invalidation.
    pub fn with_cache_trigger_opt(mut self, trigger: Option<Arc<CacheTrigger>>) -> Self {
        self.cache_trigger = trigger;
        self
    }

    /// The kind's document, or `None` if it was never written.
    pub async fn load<D: SingletonDocument>(
        &self,
    ) -> Result<Option<StoredDocument<D>>, AdminContentError> {
        record_reads(D::KIND);
        let Some(record) = self.singletons.find(D::KIND).await? else {
            return Ok(None);
        };
        decode::<D>(record).map(Some)
    }

    /// The homepage with featured product ids resolved to full records.
    ///
    /// Ids whose product no longer exists are skipped; the rest keep their order.
    pub async fn load_homepage(
        &self,
    ) -> Result<Option<StoredDocument<HomePage<Product>>>, AdminContentError> {
        let Some(stored) = self.load::<HomePage>().await? else {
            return Ok(None);
        };

        let ids = stored.document.products.products.clone();
        let resolved = self.resolve_products(&ids).await?;
        if resolved.len() < ids.len() {
            debug!(
                referenced = ids.len(),
                resolved = resolved.len(),
                "Skipping dangling homepage product references"
            );
        }

        Ok(Some(StoredDocument {
            id: stored.id,
            document: stored.document.with_products(resolved),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    /// Validate `input` and merge it into the kind's document, creating the
    /// document on first write.
    pub async fn upsert<D: SingletonDocument>(
        &self,
        input: Map<String, Value>,
    ) -> Result<StoredDocument<D>, AdminContentError> {
        let patch = prepare_patch::<D>(input)?;
        if !patch.ignored.is_empty() {
            debug!(
                kind = %D::KIND,
                ignored = ?patch.ignored,
                "Ignoring fields outside the {} schema",
                D::LABEL
            );
        }

        let fields: Vec<String> = patch
            .touched_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        let record = self
            .singletons
            .merge(D::KIND, patch.set, patch.unset)
            .await?;
        let stored = decode::<D>(record)?;

        info!(kind = %D::KIND, fields = ?fields, "Singleton document upserted");

        if let Some(trigger) = &self.cache_trigger {
            trigger.singleton_upserted(D::KIND).await;
        }

        Ok(stored)
    }

    /// Remove the kind's document. Returns whether one existed.
    pub async fn reset(&self, kind: SingletonKind) -> Result<bool, AdminContentError> {
        let existed = self.singletons.remove(kind).await?;

        info!(kind = %kind, existed, "Singleton document reset");

        if existed && let Some(trigger) = &self.cache_trigger {
            trigger.singleton_reset(kind).await;
        }

        Ok(existed)
    }

    async fn resolve_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, AdminContentError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let by_id: HashMap<Uuid, Product> = self
            .products
            .find_many(ids)
            .await?
            .into_iter()
            .map(|record| (record.id, Product::from(record)))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect())
    }
}

fn decode<D: SingletonDocument>(
    record: SingletonRecord,
) -> Result<StoredDocument<D>, AdminContentError> {
    let document = from_stored::<D>(record.body)
        .map_err(|err| DomainError::malformed(D::LABEL, err.to_string()))?;
    Ok(StoredDocument {
        id: record.kind.as_str().to_string(),
        document,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

fn record_reads(kind: SingletonKind) {
    match kind {
        SingletonKind::Shared => deps::record("/"),
        SingletonKind::Homepage => {
            deps::record("/");
            deps::record("/dashboard/homepage");
        }
        SingletonKind::Aboutus => {
            deps::record("/about-us");
            deps::record("/dashboard/about-us");
        }
    }
}
