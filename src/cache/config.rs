//! Cache configuration.

use std::num::NonZeroUsize;

const DEFAULT_RESPONSE_LIMIT: usize = 200;
const DEFAULT_RESPONSE_BODY_LIMIT_BYTES: usize = 1024 * 1024;
const DEFAULT_AUTO_CONSUME_INTERVAL_MS: u64 = 5000;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 100;
const DEFAULT_MAX_EVENT_QUEUE_LEN: usize = 10_000;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache public read responses and invalidate them after writes.
    pub enable_response_cache: bool,
    /// Maximum responses held in the L1 store.
    pub response_limit: usize,
    /// Responses with larger bodies are served but not cached.
    pub response_body_limit_bytes: usize,
    /// Auto-consume interval (ms) for leftovers.
    pub auto_consume_interval_ms: u64,
    /// Maximum events per consumption batch.
    pub consume_batch_limit: usize,
    pub max_event_queue_len: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enable_response_cache: true,
            response_limit: DEFAULT_RESPONSE_LIMIT,
            response_body_limit_bytes: DEFAULT_RESPONSE_BODY_LIMIT_BYTES,
            auto_consume_interval_ms: DEFAULT_AUTO_CONSUME_INTERVAL_MS,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
            max_event_queue_len: DEFAULT_MAX_EVENT_QUEUE_LEN,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enable_response_cache: settings.enable_response_cache,
            response_limit: settings.response_limit.get() as usize,
            response_body_limit_bytes: settings.response_body_limit_bytes.get() as usize,
            auto_consume_interval_ms: settings.auto_consume_interval_ms.get(),
            consume_batch_limit: settings.consume_batch_limit.get() as usize,
            max_event_queue_len: settings.max_event_queue_len.get() as usize,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enable_response_cache
    }

    /// Returns the response limit as NonZeroUsize, clamping to 1 if zero.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
