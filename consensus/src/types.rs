//! Core types for the randomized binary consensus protocol.
//!
//! Defines the binary value domain, the vote message exchanged between
//! processes, delivery outcomes, and the externally-visible state snapshot.

use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Identifier of a process within the cluster. Unique within a cluster and
/// stable for the process lifetime.
pub type ProcessId = u32;

// ---------------------------------------------------------------------------
// Value domain
// ---------------------------------------------------------------------------

/// The protocol value domain. Every proposal and every vote carries exactly
/// one of these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryValue {
    Zero,
    One,
}

impl BinaryValue {
    /// Numeric representation of the value.
    pub fn as_u8(self) -> u8 {
        match self {
            BinaryValue::Zero => 0,
            BinaryValue::One => 1,
        }
    }

    /// Parse a raw byte, rejecting anything outside {0, 1}.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(BinaryValue::Zero),
            1 => Some(BinaryValue::One),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// A single vote exchanged between processes: the sender's current value
/// tagged with the round it was cast in.
///
/// Votes are anonymous. No sender identity is carried or verified; the
/// decision rule only needs per-value counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// The proposed value.
    pub value: BinaryValue,
    /// The round the vote belongs to.
    pub round: u64,
}

impl Vote {
    pub fn new(value: BinaryValue, round: u64) -> Self {
        Self { value, round }
    }
}

// ---------------------------------------------------------------------------
// Delivery outcomes
// ---------------------------------------------------------------------------

/// Typed outcome of delivering a vote to a process.
///
/// Rejections are expected protocol conditions, not errors; delivery never
/// fails a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// The vote was accepted into the current round's inbox.
    Accepted,
    /// The vote was tagged with a round other than the receiver's current
    /// round and was discarded without touching any state.
    InvalidRound { current: u64, got: u64 },
    /// The receiving process is stopped, already decided, or faulty; the
    /// vote was discarded. Informational, not an error.
    AlreadySettled,
}

impl DeliveryOutcome {
    /// Return a human-readable tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryOutcome::Accepted => "accepted",
            DeliveryOutcome::InvalidRound { .. } => "invalid_round",
            DeliveryOutcome::AlreadySettled => "already_settled",
        }
    }
}

// ---------------------------------------------------------------------------
// State snapshot
// ---------------------------------------------------------------------------

/// Full externally-visible record of a process, returned verbatim by the
/// state query.
///
/// Faulty processes expose `None` for every protocol field. Consumers must
/// treat those as "not applicable", never as zero or false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Whether the process has been stopped.
    pub stopped: bool,
    /// Current proposal value, absent for faulty processes.
    pub value: Option<BinaryValue>,
    /// Whether the process has decided, absent for faulty processes.
    pub decided: Option<bool>,
    /// Current round counter, absent for faulty processes.
    pub round: Option<u64>,
}
