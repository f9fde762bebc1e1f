use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Iframe requests by outcome ("accepted" or a rejection reason)
pub static IFRAME_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "funding_iframe_requests_total",
            "Remember-funding iframe requests by outcome",
        ),
        &["outcome"],
    )
    .unwrap()
});

pub static FUNDING_REMEMBERED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "funding_remembered_total",
            "Funding sources recorded as remembered",
        ),
        &["funding_source"],
    )
    .unwrap()
});

/// Register all metrics with the registry
pub fn register_metrics() {
    for collector in [IFRAME_REQUESTS.clone(), FUNDING_REMEMBERED.clone()] {
        if let Err(e) = REGISTRY.register(Box::new(collector)) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
}
