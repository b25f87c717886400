//! Benor Test Harness
//!
//! Builds a deterministic in-process cluster: N processes (a chosen subset
//! faulty), each serving its control surface on `127.0.0.1:base_port + id`,
//! all sharing one readiness gate. Tests drive the cluster over the real
//! wire and assert on state snapshots.
//!
//! Each test picks its own base port so that tests running in parallel
//! never collide.

use {
    benor_consensus::{
        BinaryValue, DeliveryOutcome, FaultPlan, ProcessId, ProtocolConfig, StateSnapshot, Vote,
    },
    benor_net::{
        send_request, NetConfig, PeerDirectory, ProbeStatus, Request, Response, StartOutcome,
    },
    benor_node::{serve, ClusterReadiness, Process},
    std::{
        net::{IpAddr, Ipv4Addr},
        sync::Arc,
        time::Duration,
    },
    tokio::task::JoinHandle,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Collection window used by harness clusters. Short enough for fast
/// tests, long enough for loopback delivery to always make it.
pub const COLLECTION_WINDOW_MS: u64 = 250;

/// Readiness poll interval used by harness clusters.
pub const READINESS_POLL_MS: u64 = 10;

/// How long to wait for decisions before declaring a scenario stuck.
/// Randomized convergence has no deterministic bound; this is far beyond
/// the expected handful of rounds.
pub const DECISION_WAIT_MS: u64 = 60_000;

/// Snapshot poll interval while waiting for decisions.
const SNAPSHOT_POLL_MS: u64 = 50;

// ─── Test cluster ────────────────────────────────────────────────────────────

/// A fully-served cluster of benor processes on loopback.
pub struct TestCluster {
    /// The fault classification the cluster was built with.
    pub plan: FaultPlan,
    /// Every process, faulty ones included (they serve probes too).
    pub processes: Vec<Arc<Process>>,
    /// id → listener address.
    pub peers: PeerDirectory,
    /// The shared readiness gate.
    pub readiness: Arc<ClusterReadiness>,
    client_config: NetConfig,
}

impl TestCluster {
    /// Build and serve a cluster.
    ///
    /// `initial_values[i]` is process `i`'s round-0 proposal (ignored for
    /// faulty processes). Process `i` listens on `base_port + i`.
    pub async fn start(
        base_port: u16,
        initial_values: &[BinaryValue],
        faulty: &[ProcessId],
    ) -> Self {
        let cluster_size = initial_values.len() as u32;
        let plan = FaultPlan::new(cluster_size, faulty.len() as u32, faulty.iter().copied())
            .expect("valid fault plan");
        let readiness = Arc::new(ClusterReadiness::new(cluster_size));
        let peers =
            PeerDirectory::from_base_port(IpAddr::V4(Ipv4Addr::LOCALHOST), base_port, cluster_size)
                .expect("port range fits");
        let config = ProtocolConfig {
            collection_window_ms: COLLECTION_WINDOW_MS,
            readiness_poll_interval_ms: READINESS_POLL_MS,
            readiness_wait_limit_ms: None,
        };
        let client_config = NetConfig {
            bind_addr: "127.0.0.1:0".parse().expect("valid client bind addr"),
            max_message_size: 65_536,
            connect_timeout_ms: 1_000,
        };

        let mut processes = Vec::with_capacity(cluster_size as usize);
        for id in 0..cluster_size {
            let mut net_config = client_config.clone();
            net_config.bind_addr = peers.addr_of(id).expect("peer in directory");
            let process = Arc::new(
                Process::new(
                    id,
                    &plan,
                    initial_values[id as usize],
                    peers.clone(),
                    Arc::clone(&readiness),
                    config.clone(),
                    net_config.clone(),
                )
                .expect("valid process config"),
            );
            serve(Arc::clone(&process), net_config)
                .await
                .expect("listener binds");
            processes.push(process);
        }

        Self {
            plan,
            processes,
            peers,
            readiness,
            client_config,
        }
    }

    /// Listener address of the given process.
    pub fn addr(&self, id: ProcessId) -> std::net::SocketAddr {
        self.peers.addr_of(id).expect("peer in directory")
    }

    // ── Wire helpers ────────────────────────────────────────────────────

    /// Send `Start` to one process in the background; the task resolves
    /// once the process settles.
    pub fn spawn_start(&self, id: ProcessId) -> JoinHandle<Response> {
        let addr = self.addr(id);
        let config = self.client_config.clone();
        tokio::spawn(async move {
            send_request(addr, &Request::Start, &config)
                .await
                .expect("start request delivered")
        })
    }

    /// Start every correct process.
    pub fn start_all(&self) -> Vec<JoinHandle<Response>> {
        self.plan.correct_ids().map(|id| self.spawn_start(id)).collect()
    }

    /// Probe a process over the wire.
    pub async fn probe(&self, id: ProcessId) -> ProbeStatus {
        match self.request(id, Request::Probe).await {
            Response::Probe(status) => status,
            other => panic!("unexpected probe response: {other:?}"),
        }
    }

    /// Deliver a vote over the wire.
    pub async fn deliver(&self, id: ProcessId, vote: Vote) -> DeliveryOutcome {
        match self.request(id, Request::Deliver(vote)).await {
            Response::Deliver(outcome) => outcome,
            other => panic!("unexpected deliver response: {other:?}"),
        }
    }

    /// Stop a process over the wire.
    pub async fn stop(&self, id: ProcessId) {
        match self.request(id, Request::Stop).await {
            Response::Stop => {}
            other => panic!("unexpected stop response: {other:?}"),
        }
    }

    /// Query a process's state record over the wire.
    pub async fn wire_snapshot(&self, id: ProcessId) -> StateSnapshot {
        match self.request(id, Request::GetState).await {
            Response::State(snapshot) => snapshot,
            other => panic!("unexpected state response: {other:?}"),
        }
    }

    /// Run `Start` against one process and return its terminal outcome.
    pub async fn start_and_wait(&self, id: ProcessId) -> StartOutcome {
        match self.request(id, Request::Start).await {
            Response::Start(outcome) => outcome,
            other => panic!("unexpected start response: {other:?}"),
        }
    }

    async fn request(&self, id: ProcessId, request: Request) -> Response {
        send_request(self.addr(id), &request, &self.client_config)
            .await
            .expect("request delivered")
    }

    // ── Decision waiting ────────────────────────────────────────────────

    /// Poll until every listed process has decided, then return their
    /// snapshots. Panics if `DECISION_WAIT_MS` elapses first.
    pub async fn await_decisions(&self, ids: &[ProcessId]) -> Vec<StateSnapshot> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(DECISION_WAIT_MS);
        loop {
            let snapshots: Vec<StateSnapshot> = ids
                .iter()
                .map(|id| self.processes[*id as usize].snapshot())
                .collect();
            if snapshots.iter().all(|s| s.decided == Some(true)) {
                return snapshots;
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("processes {ids:?} did not all decide within {DECISION_WAIT_MS}ms: {snapshots:?}");
            }
            tokio::time::sleep(Duration::from_millis(SNAPSHOT_POLL_MS)).await;
        }
    }

    /// Poll until every correct process has decided.
    pub async fn await_correct_decisions(&self) -> Vec<StateSnapshot> {
        let correct: Vec<ProcessId> = self.plan.correct_ids().collect();
        self.await_decisions(&correct).await
    }
}
