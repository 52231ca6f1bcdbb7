//! A small wrapper around [`prometheus::Registry`] shared by both binaries.

use std::sync::Arc;

/// A cloneable handle to a process-wide Prometheus registry.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<prometheus::Registry>,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    pub fn new() -> Self {
        MetricsRegistry {
            inner: Arc::new(prometheus::Registry::new()),
        }
    }

    /// Registers a collector, ignoring an `AlreadyReg` error so that the same
    /// metric can be registered more than once across test runs.
    pub fn register(&self, collector: Box<dyn prometheus::core::Collector>) {
        if let Err(err) = self.inner.register(collector) {
            tracing::warn!(%err, "failed to register metric collector");
        }
    }

    pub fn registry(&self) -> &prometheus::Registry {
        &self.inner
    }
}
