//! Prometheus metrics for the object store.
//!
//! Counters are process-wide and registered into [`REGISTRY`] on first use of
//! [`register_metrics`]. Recording never fails an operation.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static BYTES_WRITTEN: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "spindle_store_write_bytes_total",
            "Total bytes uploaded to the backend (new objects only)",
        ),
        &["backend"],
    )
    .expect("metric creation failed")
});

pub static BYTES_READ: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "spindle_store_read_bytes_total",
            "Total bytes fetched from the backend",
        ),
        &["backend"],
    )
    .expect("metric creation failed")
});

pub static CACHE_HITS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "spindle_store_cache_hits_total",
        "Store calls answered from the existence cache without a backend call",
    )
    .expect("metric creation failed")
});

pub static EXISTING_OBJECTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "spindle_store_existing_objects_total",
        "Store calls where the backend already held the object",
    )
    .expect("metric creation failed")
});

pub static UPLOADS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("spindle_store_uploads_total", "Objects uploaded to the backend")
        .expect("metric creation failed")
});

pub static HASH_MISMATCHES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "spindle_store_hash_mismatches_total",
        "Fetched objects whose content did not match the requested id",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all store metrics with [`REGISTRY`]. Safe to call repeatedly.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(BYTES_WRITTEN.clone()),
            Box::new(BYTES_READ.clone()),
            Box::new(CACHE_HITS.clone()),
            Box::new(EXISTING_OBJECTS.clone()),
            Box::new(UPLOADS.clone()),
            Box::new(HASH_MISMATCHES.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!(error = %e, "metric registration failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        register_metrics();
        register_metrics();
        BYTES_WRITTEN.with_label_values(&["memory"]).inc_by(3);
        let text = prometheus::TextEncoder::new()
            .encode_to_string(&REGISTRY.gather())
            .unwrap();
        assert!(text.contains("spindle_store_write_bytes_total"));
    }
}
