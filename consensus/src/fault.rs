//! Crash-fault classification for cluster processes.
//!
//! A [`FaultPlan`] fixes, at construction, which processes of a cluster are
//! faulty. Faulty processes hold no protocol state, never participate in
//! rounds, and answer liveness probes as unhealthy. The classification
//! never changes after construction.

use {crate::types::ProcessId, std::collections::HashSet, thiserror::Error};

/// Errors in fault-plan construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaultPlanError {
    #[error("cluster size must be > 0")]
    EmptyCluster,
    #[error("faulty id {id} out of range for cluster of {cluster_size}")]
    IdOutOfRange { id: ProcessId, cluster_size: u32 },
    #[error("{count} faulty processes exceed the declared bound {bound}")]
    TooManyFaulty { count: usize, bound: u32 },
}

/// Fixed classification of every process in a cluster as correct or faulty.
///
/// The faulty set is assigned externally (by the operator or test harness);
/// the plan only records and answers it. `fault_tolerance` is the declared
/// upper bound F, carried for majority-threshold context. The assigned set
/// is checked against it once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultPlan {
    cluster_size: u32,
    fault_tolerance: u32,
    faulty: HashSet<ProcessId>,
}

impl FaultPlan {
    /// Create a plan for a cluster of `cluster_size` processes with the
    /// given faulty ids.
    pub fn new(
        cluster_size: u32,
        fault_tolerance: u32,
        faulty: impl IntoIterator<Item = ProcessId>,
    ) -> Result<Self, FaultPlanError> {
        if cluster_size == 0 {
            return Err(FaultPlanError::EmptyCluster);
        }
        let faulty: HashSet<ProcessId> = faulty.into_iter().collect();
        for &id in &faulty {
            if id >= cluster_size {
                return Err(FaultPlanError::IdOutOfRange { id, cluster_size });
            }
        }
        if faulty.len() > fault_tolerance as usize {
            return Err(FaultPlanError::TooManyFaulty {
                count: faulty.len(),
                bound: fault_tolerance,
            });
        }
        Ok(Self {
            cluster_size,
            fault_tolerance,
            faulty,
        })
    }

    /// A plan where every process is correct.
    pub fn fully_correct(cluster_size: u32) -> Result<Self, FaultPlanError> {
        Self::new(cluster_size, 0, [])
    }

    /// Whether the given process is faulty. Fixed for the plan's lifetime.
    pub fn is_faulty(&self, id: ProcessId) -> bool {
        self.faulty.contains(&id)
    }

    /// Total participant count N.
    pub fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    /// Declared upper bound F on faulty processes.
    pub fn fault_tolerance(&self) -> u32 {
        self.fault_tolerance
    }

    /// Number of processes actually marked faulty.
    pub fn faulty_count(&self) -> usize {
        self.faulty.len()
    }

    /// Number of correct processes.
    pub fn correct_count(&self) -> usize {
        self.cluster_size as usize - self.faulty.len()
    }

    /// Iterator over every process id in the cluster.
    pub fn ids(&self) -> impl Iterator<Item = ProcessId> {
        0..self.cluster_size
    }

    /// Iterator over the ids of correct processes.
    pub fn correct_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        (0..self.cluster_size).filter(move |id| !self.is_faulty(*id))
    }
}
