//! In-memory repository doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sitedesk::application::admin::{AdminContentService, AdminProductService};
use sitedesk::application::repos::{
    CreateProductParams, HealthRepo, ProductsRepo, RepoError, SingletonRepo, UpdateProductParams,
};
use sitedesk::cache::{
    CacheConfig, CacheConsumer, CacheRegistry, CacheState, CacheTrigger, EventQueue, L1Store,
};
use sitedesk::domain::entities::{ProductRecord, SingletonRecord};
use sitedesk::infra::http::ApiState;
use sitedesk_api_types::SingletonKind;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;
use uuid::Uuid;

const EPOCH: OffsetDateTime = datetime!(2025-01-01 00:00 UTC);

/// Repository double with one clock shared by singletons and products, so
/// every write gets a distinct, increasing timestamp.
#[derive(Default)]
pub struct MemoryRepos {
    singletons: Mutex<HashMap<SingletonKind, SingletonRecord>>,
    products: Mutex<HashMap<Uuid, ProductRecord>>,
    ticks: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn singleton_count(&self) -> usize {
        self.singletons.lock().await.len()
    }

    pub async fn stored_body(&self, kind: SingletonKind) -> Option<Value> {
        self.singletons
            .lock()
            .await
            .get(&kind)
            .map(|record| record.body.clone())
    }

    fn now(&self) -> OffsetDateTime {
        EPOCH + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl SingletonRepo for MemoryRepos {
    async fn find(&self, kind: SingletonKind) -> Result<Option<SingletonRecord>, RepoError> {
        self.check()?;
        Ok(self.singletons.lock().await.get(&kind).cloned())
    }

    async fn merge(
        &self,
        kind: SingletonKind,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<SingletonRecord, RepoError> {
        self.check()?;
        let now = self.now();
        let mut singletons = self.singletons.lock().await;
        let record = singletons.entry(kind).or_insert_with(|| SingletonRecord {
            kind,
            body: Value::Object(Map::new()),
            created_at: now,
            updated_at: now,
        });

        // jsonb `||` followed by `- text[]`
        if let Value::Object(body) = &mut record.body {
            body.extend(set);
            for key in &unset {
                body.remove(key);
            }
        }
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn remove(&self, kind: SingletonKind) -> Result<bool, RepoError> {
        self.check()?;
        Ok(self.singletons.lock().await.remove(&kind).is_some())
    }
}

#[async_trait]
impl ProductsRepo for MemoryRepos {
    async fn insert(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError> {
        self.check()?;
        let now = self.now();
        let record = ProductRecord {
            id: params.id,
            title: params.title,
            description: params.description,
            images: params.images,
            attributes: params.attributes,
            created_at: now,
            updated_at: now,
        };
        let mut products = self.products.lock().await;
        if products.contains_key(&record.id) {
            return Err(RepoError::Duplicate {
                constraint: "products_pkey".into(),
            });
        }
        products.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError> {
        self.check()?;
        Ok(self.products.lock().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductRecord>, RepoError> {
        self.check()?;
        let products = self.products.lock().await;
        Ok(products
            .values()
            .filter(|record| ids.contains(&record.id))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        params: UpdateProductParams,
    ) -> Result<Option<ProductRecord>, RepoError> {
        self.check()?;
        let now = self.now();
        let mut products = self.products.lock().await;
        let Some(record) = products.get_mut(&params.id) else {
            return Ok(None);
        };
        if let Some(title) = params.title {
            record.title = title;
        }
        if let Some(description) = params.description {
            record.description = description;
        }
        if let Some(images) = params.images {
            record.images = images;
        }
        if let Some(attributes) = params.attributes {
            record.attributes = attributes;
        }
        record.updated_at = now;
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        self.check()?;
        Ok(self.products.lock().await.remove(&id).is_some())
    }

    async fn list_newest_first(&self) -> Result<Vec<ProductRecord>, RepoError> {
        self.check()?;
        let mut records: Vec<ProductRecord> =
            self.products.lock().await.values().cloned().collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(records)
    }
}

#[async_trait]
impl HealthRepo for MemoryRepos {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check()
    }
}

/// Cache wiring as the binary builds it.
pub struct TestCache {
    pub trigger: Arc<CacheTrigger>,
    pub state: CacheState,
    pub l1: Arc<L1Store>,
    pub registry: Arc<CacheRegistry>,
    pub queue: Arc<EventQueue>,
}

pub fn build_cache(config: CacheConfig) -> TestCache {
    let l1 = Arc::new(L1Store::new(&config));
    let registry = Arc::new(CacheRegistry::new());
    let queue = Arc::new(EventQueue::new_with_limit(config.max_event_queue_len));
    let consumer = Arc::new(CacheConsumer::new(
        config.clone(),
        l1.clone(),
        registry.clone(),
        queue.clone(),
    ));
    let trigger = Arc::new(CacheTrigger::new(config.clone(), queue.clone(), consumer));
    TestCache {
        trigger,
        state: CacheState {
            config,
            l1: l1.clone(),
            registry: registry.clone(),
        },
        l1,
        registry,
        queue,
    }
}

pub fn content_service(repos: &Arc<MemoryRepos>) -> AdminContentService {
    let singletons: Arc<dyn SingletonRepo> = repos.clone();
    let products: Arc<dyn ProductsRepo> = repos.clone();
    AdminContentService::new(singletons, products)
}

pub fn product_service(repos: &Arc<MemoryRepos>) -> AdminProductService {
    let products: Arc<dyn ProductsRepo> = repos.clone();
    AdminProductService::new(products)
}

pub fn api_state(repos: &Arc<MemoryRepos>, cache: Option<&TestCache>) -> ApiState {
    let trigger = cache.map(|cache| cache.trigger.clone());
    let health: Arc<dyn HealthRepo> = repos.clone();
    ApiState {
        content: Arc::new(content_service(repos).with_cache_trigger_opt(trigger.clone())),
        products: Arc::new(product_service(repos).with_cache_trigger_opt(trigger)),
        health,
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
