// metrics.rs — Increment-only named counters.
//
// Components depend on the narrow `MetricsSink` trait; `MetricsRegistry` is
// the in-process implementation. Counters are created on first use and live
// for the life of the registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Receiver for counter increments.
///
/// Implementations must be cheap and must not block for long: they are
/// called on every guardrail check.
pub trait MetricsSink: Send + Sync {
    /// Increment the counter called `name` by one.
    fn increment(&self, name: &str);
}

/// A monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe registry of named counters.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the counter called `name`, creating it if needed.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        // Fast path: the counter usually exists already.
        {
            let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(counter) = counters.get(name) {
                return Arc::clone(counter);
            }
        }
        let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(counters.entry(name.to_string()).or_default())
    }

    /// Current value of `name`, or 0 if it was never incremented.
    pub fn get(&self, name: &str) -> u64 {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        counters.get(name).map_or(0, |c| c.get())
    }

    /// All counters, sorted by name.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        counters
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect()
    }
}

impl MetricsSink for MetricsRegistry {
    fn increment(&self, name: &str) {
        self.counter(name).inc();
    }
}

/// Discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _name: &str) {}
}
