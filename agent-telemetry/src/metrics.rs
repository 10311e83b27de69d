//! A small Prometheus-text-exposition metrics registry.
//!
//! Shared by any process in the workspace that wants a `/metrics` endpoint
//! without committing to a specific wire metrics crate; the HTTP policy
//! server keeps its own request counters inline since they are simple
//! enough not to need this, but a richer host process (the lifecycle
//! executor's sync bridge, the `apl` CLI) can use this instead of
//! hand-rolling its own.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A set of named counters and gauges, safe to share across tasks.
#[derive(Default)]
pub struct MetricsRegistry {
    counters: Mutex<HashMap<String, AtomicU64>>,
    gauges: Mutex<HashMap<String, AtomicU64>>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the named counter by one, creating it at zero first if
    /// this is its first observation.
    pub fn increment(&self, name: &str) {
        let mut counters = self.counters.lock().expect("metrics registry poisoned");
        counters
            .entry(name.to_owned())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Sets the named gauge to `value`, creating it first if this is its
    /// first observation.
    pub fn set_gauge(&self, name: &str, value: u64) {
        let mut gauges = self.gauges.lock().expect("metrics registry poisoned");
        gauges
            .entry(name.to_owned())
            .or_insert_with(|| AtomicU64::new(0))
            .store(value, Ordering::Relaxed);
    }

    /// Reads the current value of a named counter, or zero if it has
    /// never been incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .expect("metrics registry poisoned")
            .get(name)
            .map_or(0, |value| value.load(Ordering::Relaxed))
    }

    /// Renders every counter and gauge as Prometheus text exposition
    /// format, counters first, then gauges, each sorted by name for
    /// deterministic output.
    #[must_use]
    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();

        let counters = self.counters.lock().expect("metrics registry poisoned");
        let mut names: Vec<&String> = counters.keys().collect();
        names.sort();
        for name in names {
            let value = counters[name].load(Ordering::Relaxed);
            out.push_str(&format!("# TYPE {name} counter\n{name} {value}\n"));
        }
        drop(counters);

        let gauges = self.gauges.lock().expect("metrics registry poisoned");
        let mut names: Vec<&String> = gauges.keys().collect();
        names.sort();
        for name in names {
            let value = gauges[name].load(Ordering::Relaxed);
            out.push_str(&format!("# TYPE {name} gauge\n{name} {value}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let registry = MetricsRegistry::new();
        assert_eq!(registry.counter("requests_total"), 0);
        registry.increment("requests_total");
        registry.increment("requests_total");
        assert_eq!(registry.counter("requests_total"), 2);
    }

    #[test]
    fn rendering_includes_both_families() {
        let registry = MetricsRegistry::new();
        registry.increment("requests_total");
        registry.set_gauge("uptime_seconds", 42);

        let text = registry.render_prometheus();
        assert!(text.contains("requests_total 1"));
        assert!(text.contains("uptime_seconds 42"));
    }
}
