//! Cache event system.
//!
//! Defines cache events and an in-memory queue for event-driven invalidation.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use metrics::{counter, gauge};
use sitedesk_api_types::SingletonKind;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::keys::InvalidationTarget;
use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";
const METRIC_QUEUE_LEN: &str = "sitedesk_cache_event_queue_len";
const METRIC_DROPPED_TOTAL: &str = "sitedesk_cache_event_dropped_total";

/// Monotonic epoch for ordering events within this process.
pub type Epoch = u64;

/// Cache event with idempotency and ordering support.
#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier for idempotency (UUIDv4).
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub timestamp: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Committed writes that make cached pages stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    SingletonUpserted { kind: SingletonKind },
    SingletonReset { kind: SingletonKind },
    ProductCreated { id: Uuid },
    ProductUpdated { id: Uuid },
    ProductDeleted { id: Uuid },
    /// Explicit invalidation of arbitrary pages.
    Paths(Vec<InvalidationTarget>),
}

/// In-memory event queue for cache invalidation.
///
/// When bounded and full, the oldest event is dropped and the queue is
/// flagged as overflowed; the next consumer must then flush everything.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
    max_len: Option<usize>,
    overflowed: AtomicBool,
}

impl EventQueue {
    /// Create an unbounded queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
            max_len: None,
            overflowed: AtomicBool::new(false),
        }
    }

    /// Create a queue holding at most `max_len` events (clamped to 1).
    pub fn new_with_limit(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len.max(1)),
            ..Self::new()
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let epoch = self.next_epoch();
        let event = CacheEvent::new(kind, epoch);

        info!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "Cache event enqueued"
        );

        let mut queue = mutex_lock(&self.queue, SOURCE, "publish");
        if let Some(max_len) = self.max_len {
            while queue.len() >= max_len {
                if let Some(dropped) = queue.pop_front() {
                    warn!(
                        event_id = %dropped.id,
                        event_kind = ?dropped.kind,
                        max_len,
                        "Cache event dropped: queue full"
                    );
                    counter!(METRIC_DROPPED_TOTAL).increment(1);
                    self.overflowed.store(true, Ordering::SeqCst);
                }
            }
        }
        queue.push_back(event);
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
    }

    /// Drain up to `limit` events in FIFO order.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        let drained = queue.drain(..count).collect();
        gauge!(METRIC_QUEUE_LEN).set(queue.len() as f64);
        drained
    }

    /// Returns whether events were dropped since the last call, clearing the flag.
    pub fn take_overflow(&self) -> bool {
        self.overflowed.swap(false, Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        mutex_lock(&self.queue, SOURCE, "clear").clear();
        gauge!(METRIC_QUEUE_LEN).set(0.0);
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
