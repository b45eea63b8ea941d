use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "sitedesk_cache_l1_hit_total",
            Unit::Count,
            "Public GETs served from the response cache."
        );
        describe_counter!(
            "sitedesk_cache_l1_miss_total",
            Unit::Count,
            "Public GETs that had to run their handler."
        );
        describe_counter!(
            "sitedesk_cache_l1_evict_total",
            Unit::Count,
            "Cached responses pushed out by the capacity limit."
        );
        describe_counter!(
            "sitedesk_cache_invalidated_total",
            Unit::Count,
            "Cached responses dropped by content writes."
        );
        describe_gauge!(
            "sitedesk_cache_event_queue_len",
            Unit::Count,
            "Invalidation events waiting to be consumed."
        );
        describe_counter!(
            "sitedesk_cache_event_dropped_total",
            Unit::Count,
            "Invalidation events dropped because the queue was full."
        );
        describe_histogram!(
            "sitedesk_cache_consume_ms",
            Unit::Milliseconds,
            "Time spent applying one batch of invalidation events."
        );
    });
}
