//! Randomized Binary Consensus Engine
//!
//! This crate implements the protocol core of a Ben-Or-style randomized
//! binary consensus: round-bounded value broadcast, vote aggregation,
//! majority-threshold decision, and a randomized fallback when no
//! majority exists.
//!
//! 1. **Broadcast** — each correct process sends its current value, tagged
//!    with its round, to every peer.
//! 2. **Collect** — votes for the current round accumulate in a
//!    round-scoped inbox; votes tagged with any other round are rejected.
//! 3. **Decide** — a value with `floor(N/2) + 1` votes is adopted as the
//!    terminal decision; otherwise the process adopts a fresh uniform
//!    random value and advances to the next round.
//!
//! # Key Properties
//!
//! - **Probabilistic termination**: no deterministic round bound exists;
//!   the uniform-random fallback makes eventual agreement overwhelmingly
//!   likely, with an expected O(1) rounds when enough processes are
//!   correct.
//! - **Crash-fault model**: faulty processes are silent non-participants.
//!   They hold no protocol state at all and answer liveness probes as
//!   unhealthy. No Byzantine-content validation is attempted.
//! - **Decision immutability**: once a process decides, the decision never
//!   reverts and the process originates no further broadcasts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              ConsensusEngine                 │
//! │  ┌─────────┐  ┌──────────┐  ┌───────────┐  │
//! │  │ Config  │  │  Fault   │  │  Round    │  │
//! │  │         │  │  Plan    │  │  Inbox    │  │
//! │  └─────────┘  └──────────┘  └───────────┘  │
//! │  ┌─────────────────────────────────────┐    │
//! │  │         value, round, decided       │    │
//! │  └─────────────────────────────────────┘    │
//! │  ┌──────────────────────────────┐           │
//! │  │  Decision Rule (majority or  │           │
//! │  │  Bernoulli(0.5) fallback)    │           │
//! │  └──────────────────────────────┘           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! All I/O lives elsewhere: the node runtime drives the engine, and the
//! wire layer carries the votes.

pub mod config;
pub mod decision;
pub mod engine;
pub mod fault;
pub mod inbox;
pub mod types;

// Re-exports for convenience
pub use config::ProtocolConfig;
pub use decision::{decide, majority_threshold, Decision};
pub use engine::{ConsensusEngine, RoundOutcome};
pub use fault::{FaultPlan, FaultPlanError};
pub use inbox::RoundInbox;
pub use types::{BinaryValue, DeliveryOutcome, ProcessId, StateSnapshot, Vote};
