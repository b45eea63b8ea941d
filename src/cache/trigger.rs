//! Cache trigger service.
//!
//! Publishes invalidation events after committed writes and, by default,
//! consumes them right away so the next read sees fresh data.

use std::sync::Arc;

use sitedesk_api_types::SingletonKind;
use tracing::debug;
use uuid::Uuid;

use super::config::CacheConfig;
use super::consumer::CacheConsumer;
use super::events::{EventKind, EventQueue};
use super::keys::InvalidationTarget;

pub struct CacheTrigger {
    config: CacheConfig,
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(config: CacheConfig, queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self {
            config,
            queue,
            consumer,
        }
    }

    /// Publish an event and optionally consume immediately.
    ///
    /// Skipped entirely when the response cache is disabled.
    pub async fn trigger(&self, kind: EventKind, consume_now: bool) {
        if !self.config.is_enabled() {
            debug!(event_kind = ?kind, "Cache trigger skipped: cache disabled");
            return;
        }

        self.queue.publish(kind);

        if consume_now {
            self.consumer.consume().await;
        }
    }

    /// Mark arbitrary pages stale.
    pub async fn invalidate(&self, targets: Vec<InvalidationTarget>) {
        if targets.is_empty() {
            return;
        }
        self.trigger(EventKind::Paths(targets), true).await;
    }

    pub async fn singleton_upserted(&self, kind: SingletonKind) {
        self.trigger(EventKind::SingletonUpserted { kind }, true).await;
    }

    pub async fn singleton_reset(&self, kind: SingletonKind) {
        self.trigger(EventKind::SingletonReset { kind }, true).await;
    }

    pub async fn product_created(&self, id: Uuid) {
        self.trigger(EventKind::ProductCreated { id }, true).await;
    }

    pub async fn product_updated(&self, id: Uuid) {
        self.trigger(EventKind::ProductUpdated { id }, true).await;
    }

    pub async fn product_deleted(&self, id: Uuid) {
        self.trigger(EventKind::ProductDeleted { id }, true).await;
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}
