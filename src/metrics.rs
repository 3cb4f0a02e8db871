// Metrics hooks for the clustering engine.
//
// Callers install a global `ClusterMetrics` implementation via
// [`set_cluster_metrics`], then every `ClusterEngine::cluster_images` call
// reports its latency and counts. This keeps instrumentation decoupled from
// any specific metrics backend.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for clustering runs.
pub trait ClusterMetrics: Send + Sync {
    /// Record the outcome of one clustering run.
    ///
    /// `image_count` is the number of submitted images, `cluster_count` the
    /// number of output groups, `failure_count` the number of pairwise
    /// comparisons that could not be computed, and `latency` the wall-clock
    /// duration of the whole run.
    fn record_clustering(
        &self,
        image_count: usize,
        cluster_count: usize,
        failure_count: usize,
        latency: Duration,
    );
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn ClusterMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn ClusterMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn ClusterMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global cluster metrics recorder.
///
/// Typically called once during service startup so all engines share the same
/// metrics backend.
pub fn set_cluster_metrics(recorder: Option<Arc<dyn ClusterMetrics>>) {
    let lock = metrics_lock();
    let mut guard = lock.write().expect("cluster metrics lock poisoned");
    *guard = recorder;
}
