//! Cache consumer for executing consumption plans.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::EventQueue;
use super::planner::ConsumptionPlan;
use super::registry::CacheRegistry;
use super::store::L1Store;

const METRIC_CACHE_CONSUME_MS: &str = "sitedesk_cache_consume_ms";
const METRIC_CACHE_INVALIDATED_TOTAL: &str = "sitedesk_cache_invalidated_total";

/// Drains the event queue and evicts every cached response the events make stale.
pub struct CacheConsumer {
    config: CacheConfig,
    l1: Arc<L1Store>,
    registry: Arc<CacheRegistry>,
    queue: Arc<EventQueue>,
}

impl CacheConsumer {
    pub fn new(
        config: CacheConfig,
        l1: Arc<L1Store>,
        registry: Arc<CacheRegistry>,
        queue: Arc<EventQueue>,
    ) -> Self {
        Self {
            config,
            l1,
            registry,
            queue,
        }
    }

    /// Consume one batch of pending events.
    ///
    /// Returns true if any events were processed.
    #[instrument(skip(self))]
    pub async fn consume(&self) -> bool {
        let started_at = Instant::now();
        let events = self.queue.drain(self.config.consume_batch_limit);
        let overflowed = self.queue.take_overflow();
        if events.is_empty() && !overflowed {
            return false;
        }

        let event_ids: Vec<Uuid> = events.iter().map(|event| event.id).collect();
        let mut plan = ConsumptionPlan::from_events(events);
        if overflowed {
            warn!("Cache event queue overflowed; flushing every cached response");
            plan = plan.flush_all();
        }

        info!(
            event_count = plan.event_count,
            event_ids = ?event_ids,
            plan = %plan,
            "Cache consumption starting"
        );

        // In-flight reads started before this point must not be cached.
        self.l1.advance_generation();
        let invalidated = if plan.invalidate_all {
            self.invalidate_everything()
        } else {
            self.invalidate_targets(&plan)
        };

        info!(
            event_count = plan.event_count,
            invalidated, "Cache consumption complete"
        );
        counter!(METRIC_CACHE_INVALIDATED_TOTAL).increment(invalidated as u64);
        histogram!(METRIC_CACHE_CONSUME_MS)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        true
    }

    /// Drain the queue completely, batch by batch.
    pub async fn consume_all(&self) -> usize {
        let mut batches = 0;
        while self.consume().await {
            batches += 1;
        }
        batches
    }

    fn invalidate_targets(&self, plan: &ConsumptionPlan) -> usize {
        let mut invalidated = 0;
        for target in &plan.targets {
            for key in self.registry.keys_for_target(target) {
                if self.l1.invalidate(&key) {
                    invalidated += 1;
                }
                self.registry.unregister(&key);
            }
        }
        invalidated
    }

    fn invalidate_everything(&self) -> usize {
        let invalidated = self.l1.len();
        self.l1.invalidate_all();
        self.registry.clear();
        invalidated
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn l1(&self) -> &Arc<L1Store> {
        &self.l1
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }
}
