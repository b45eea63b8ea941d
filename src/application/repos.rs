//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sitedesk_api_types::{MediaReference, ProductAttribute, SingletonKind};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{ProductRecord, SingletonRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait SingletonRepo: Send + Sync {
    async fn find(&self, kind: SingletonKind) -> Result<Option<SingletonRecord>, RepoError>;

    /// Create the kind's row if absent, then overwrite the `set` fields and
    /// drop the `unset` fields, all in one statement.
    async fn merge(
        &self,
        kind: SingletonKind,
        set: Map<String, Value>,
        unset: Vec<String>,
    ) -> Result<SingletonRecord, RepoError>;

    /// Returns whether a row existed.
    async fn remove(&self, kind: SingletonKind) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateProductParams {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub images: Vec<MediaReference>,
    pub attributes: Vec<ProductAttribute>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductParams {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<MediaReference>>,
    pub attributes: Option<Vec<ProductAttribute>>,
}

#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn insert(&self, params: CreateProductParams) -> Result<ProductRecord, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductRecord>, RepoError>;

    /// Records for the given ids, in no particular order; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<ProductRecord>, RepoError>;

    async fn update(&self, params: UpdateProductParams)
    -> Result<Option<ProductRecord>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;

    async fn list_newest_first(&self) -> Result<Vec<ProductRecord>, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
