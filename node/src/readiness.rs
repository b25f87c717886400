//! Cluster readiness gate.
//!
//! Every process marks itself ready exactly once, when its listener is
//! bound and serving. The round driver polls [`ClusterReadiness::all_ready`]
//! before its first round so that no broadcast is sent into a cluster that
//! cannot yet receive it.

use {
    benor_consensus::ProcessId,
    log::{debug, info},
    std::{collections::HashSet, sync::RwLock},
};

/// Shared readiness bookkeeping for one cluster.
///
/// Thread-safe; shared between processes (and their serving tasks) behind
/// an `Arc`.
#[derive(Debug)]
pub struct ClusterReadiness {
    expected: u32,
    ready: RwLock<HashSet<ProcessId>>,
}

impl ClusterReadiness {
    /// Create a gate expecting `expected` processes to report in.
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            ready: RwLock::new(HashSet::new()),
        }
    }

    /// Record that a process's transport is bound and serving. Idempotent.
    pub fn mark_ready(&self, id: ProcessId) {
        let mut ready = self.ready.write().unwrap();
        if ready.insert(id) {
            info!(
                "process {} ready ({}/{})",
                id,
                ready.len(),
                self.expected
            );
        } else {
            debug!("process {} marked ready again, ignoring", id);
        }
    }

    /// Whether every expected process has reported ready.
    pub fn all_ready(&self) -> bool {
        self.ready.read().unwrap().len() >= self.expected as usize
    }

    /// Number of processes that have reported ready so far.
    pub fn ready_count(&self) -> usize {
        self.ready.read().unwrap().len()
    }

    /// The cluster size this gate was built for.
    pub fn expected(&self) -> u32 {
        self.expected
    }
}
