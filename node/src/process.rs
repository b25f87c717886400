//! The per-process runtime: protocol state, control surface, and the
//! round driver loop.
//!
//! A [`Process`] owns one participant's entire state: the consensus engine
//! (absent for faulty processes), the round-scoped inbox shared with the
//! delivery path, the stop flag, and the peer directory. The [`Process::run`]
//! loop is the protocol itself:
//!
//! ```text
//! ready? ──▶ reset inbox ──▶ broadcast ──▶ collection window ──▶ decide
//!                ▲                                                 │
//!                └──────────────── next round ◀────────── no majority
//! ```
//!
//! Two activities touch a process concurrently: the driver loop and
//! inbound deliveries from the transport. They meet only at the inbox
//! (mutex-guarded) and the engine record (read/write lock, never held
//! across an await). The stop flag is honored at loop-iteration
//! boundaries, never by interrupting an in-flight wait or broadcast.

use {
    crate::readiness::ClusterReadiness,
    benor_consensus::{
        config::ConfigError, BinaryValue, ConsensusEngine, DeliveryOutcome, FaultPlan, ProcessId,
        ProtocolConfig, RoundInbox, StateSnapshot, Vote,
    },
    benor_net::{broadcast_vote, NetConfig, PeerDirectory, ProbeStatus, StartOutcome},
    log::{debug, info, warn},
    std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, RwLock,
        },
        time::Duration,
    },
    thiserror::Error,
};

/// Fatal conditions a protocol run can end with.
///
/// Everything else a run can produce is a normal [`StartOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The configured readiness wait limit elapsed before every peer
    /// reported in.
    #[error("cluster did not become ready within {limit_ms}ms")]
    ClusterNeverReady { limit_ms: u64 },
}

/// One consensus participant.
///
/// Faulty processes hold no engine: their proposal, round, and decided
/// fields do not exist, and the snapshot reports them as `None`, never as
/// zero or false.
pub struct Process {
    id: ProcessId,
    engine: Option<RwLock<ConsensusEngine>>,
    inbox: RoundInbox,
    stopped: AtomicBool,
    running: AtomicBool,
    peers: PeerDirectory,
    readiness: Arc<ClusterReadiness>,
    config: ProtocolConfig,
    net_config: NetConfig,
}

impl Process {
    /// Create a process according to its classification in `fault_plan`.
    ///
    /// `initial_value` is the round-0 proposal; it is ignored for faulty
    /// processes, which never hold a proposal at all.
    pub fn new(
        id: ProcessId,
        fault_plan: &FaultPlan,
        initial_value: BinaryValue,
        peers: PeerDirectory,
        readiness: Arc<ClusterReadiness>,
        config: ProtocolConfig,
        net_config: NetConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = (!fault_plan.is_faulty(id)).then(|| {
            RwLock::new(ConsensusEngine::new(
                id,
                fault_plan.cluster_size(),
                initial_value,
            ))
        });
        Ok(Self {
            id,
            engine,
            inbox: RoundInbox::new(),
            stopped: AtomicBool::new(false),
            running: AtomicBool::new(false),
            peers,
            readiness,
            config,
            net_config,
        })
    }

    // ── Control surface ─────────────────────────────────────────────────

    /// Liveness: faulty processes are unhealthy, correct ones healthy.
    pub fn probe(&self) -> ProbeStatus {
        if self.is_faulty() {
            ProbeStatus::Unhealthy
        } else {
            ProbeStatus::Healthy
        }
    }

    /// Deliver one vote for aggregation into the current round.
    ///
    /// A settled process (stopped, decided, or faulty) discards the vote
    /// with an informational outcome; otherwise the inbox accepts or
    /// rejects it by round.
    pub fn deliver(&self, vote: &Vote) -> DeliveryOutcome {
        if self.is_faulty() || self.stopped() || self.is_decided() {
            return DeliveryOutcome::AlreadySettled;
        }
        let outcome = self.inbox.accept(vote);
        debug!(
            "process {}: vote (value {}, round {}) {}",
            self.id,
            vote.value,
            vote.round,
            outcome.kind()
        );
        outcome
    }

    /// Stop the process. Idempotent; never rolls back a decision. Honored
    /// by the driver at its next loop-iteration boundary.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            info!("process {}: stop requested", self.id);
        }
    }

    /// The full externally-visible state record.
    pub fn snapshot(&self) -> StateSnapshot {
        let stopped = self.stopped();
        match &self.engine {
            None => StateSnapshot {
                stopped,
                value: None,
                decided: None,
                round: None,
            },
            Some(engine) => {
                let engine = engine.read().unwrap();
                StateSnapshot {
                    stopped,
                    value: Some(engine.value()),
                    decided: Some(engine.is_decided()),
                    round: Some(engine.round()),
                }
            }
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn is_faulty(&self) -> bool {
        self.engine.is_none()
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The readiness gate this process reports to and polls.
    pub fn readiness(&self) -> &Arc<ClusterReadiness> {
        &self.readiness
    }

    fn is_decided(&self) -> bool {
        self.engine
            .as_ref()
            .is_some_and(|engine| engine.read().unwrap().is_decided())
    }

    // ── Round driver ────────────────────────────────────────────────────

    /// Run the protocol to a terminal outcome.
    ///
    /// Returns once the process has decided or been stopped. Fails only if
    /// a configured readiness wait limit elapses first; by default the
    /// readiness wait is unbounded.
    pub async fn run(&self) -> Result<StartOutcome, ProtocolError> {
        let Some(engine) = &self.engine else {
            warn!("process {}: start requested on a faulty process", self.id);
            return Ok(StartOutcome::Faulty);
        };
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("process {}: start requested while already running", self.id);
            return Ok(StartOutcome::AlreadyRunning);
        }
        let result = self.drive_rounds(engine).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn drive_rounds(
        &self,
        engine: &RwLock<ConsensusEngine>,
    ) -> Result<StartOutcome, ProtocolError> {
        if engine.read().unwrap().is_decided() {
            return Ok(StartOutcome::AlreadySettled);
        }
        if self.stopped() {
            return Ok(StartOutcome::Stopped);
        }

        self.await_cluster_ready().await?;
        if self.stopped() {
            return Ok(StartOutcome::Stopped);
        }
        info!("process {}: cluster ready, entering round 0", self.id);

        let window = Duration::from_millis(self.config.collection_window_ms);
        loop {
            if self.stopped() {
                info!(
                    "process {}: stopped in round {}",
                    self.id,
                    engine.read().unwrap().round()
                );
                return Ok(StartOutcome::Stopped);
            }

            let vote = engine.read().unwrap().current_vote();
            self.inbox.reset(vote.round);
            debug!(
                "process {}: broadcasting value {} for round {}",
                self.id, vote.value, vote.round
            );
            let failures = broadcast_vote(
                &self.peers.peers_except(self.id),
                vote,
                &self.net_config,
            )
            .await;
            for (peer, error) in failures {
                warn!(
                    "process {}: broadcast to peer {} failed: {}",
                    self.id, peer, error
                );
            }

            // The synchrony assumption: every correct peer's round-k vote
            // is expected to arrive within this window. Votes that miss it
            // are excluded from the tally.
            tokio::time::sleep(window).await;

            let received = self.inbox.drain();
            let outcome = engine
                .write()
                .unwrap()
                .complete_round(&received, &mut rand::rng());
            if outcome.decided {
                return Ok(StartOutcome::Decided {
                    value: outcome.value,
                    round: outcome.round,
                });
            }
        }
    }

    /// Poll the readiness gate until every process has reported in.
    ///
    /// Unbounded by default; a configured wait limit turns a stalled
    /// cluster into a fatal error instead.
    async fn await_cluster_ready(&self) -> Result<(), ProtocolError> {
        let poll = Duration::from_millis(self.config.readiness_poll_interval_ms);
        let started = tokio::time::Instant::now();
        while !self.readiness.all_ready() {
            if self.stopped() {
                return Ok(());
            }
            if let Some(limit_ms) = self.config.readiness_wait_limit_ms {
                if started.elapsed() >= Duration::from_millis(limit_ms) {
                    warn!(
                        "process {}: cluster not ready after {}ms ({}/{} reported)",
                        self.id,
                        limit_ms,
                        self.readiness.ready_count(),
                        self.readiness.expected()
                    );
                    return Err(ProtocolError::ClusterNeverReady { limit_ms });
                }
            }
            tokio::time::sleep(poll).await;
        }
        Ok(())
    }
}
