//! Response cache and page invalidation.
//!
//! Public read responses are cached in an LRU store (L1) and registered
//! against the logical site pages they feed. Writes publish events; the
//! consumer folds them into a plan and evicts the affected responses.
//!
//! ```toml
//! [cache]
//! enable_response_cache = true
//! response_limit = 200
//! auto_consume_interval_ms = 5000
//! ```

mod config;
mod consumer;
pub mod deps;
mod events;
mod keys;
mod lock;
mod middleware;
mod planner;
mod registry;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use consumer::CacheConsumer;
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use keys::{InvalidationTarget, L1Key, PagePath, hash_query};
pub use middleware::{CacheState, response_cache_layer};
pub use planner::{ConsumptionPlan, targets_for};
pub use registry::CacheRegistry;
pub use store::{CachedResponse, L1Store};
pub use trigger::CacheTrigger;
