//! Wire types and serialization for inter-process communication.
//!
//! All messages are serialized with bincode for compact wire representation.
//! Every frame on a connection is a length-prefixed bincode encoding of
//! exactly one [`Request`] or [`Response`]:
//!
//! ```text
//! [len: u32-le][payload: len bytes]
//! ```
//!
//! The schema covers the whole control surface of a process: liveness
//! probe, vote delivery, protocol start/stop, and the state snapshot query.

use {
    crate::error::{NetError, Result},
    benor_consensus::{BinaryValue, DeliveryOutcome, StateSnapshot, Vote},
    serde::{Deserialize, Serialize},
};

/// A request sent to a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Liveness probe. Faulty processes answer unhealthy.
    Probe,
    /// Deliver one vote for aggregation into the receiver's current round.
    Deliver(Vote),
    /// Run the consensus protocol. The response arrives only once the
    /// process has decided or been stopped.
    Start,
    /// Stop the process. Acknowledged unconditionally.
    Stop,
    /// Query the full process state record.
    GetState,
}

/// A response to a [`Request`], carried on the same connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Answer to a liveness probe.
    Probe(ProbeStatus),
    /// Typed outcome of a vote delivery.
    Deliver(DeliveryOutcome),
    /// Terminal outcome of a protocol run.
    Start(StartOutcome),
    /// Stop acknowledgement.
    Stop,
    /// The full process state record, `None` markers included.
    State(StateSnapshot),
    /// A fatal condition that prevented the request from completing,
    /// e.g. the cluster never became ready.
    Error(String),
}

/// Liveness of a process. Faulty processes are unhealthy for their whole
/// lifetime; correct processes are healthy for theirs. No intermediate
/// states exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

/// Terminal outcome of a protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOutcome {
    /// The process reached a decision.
    Decided {
        /// The decided value.
        value: BinaryValue,
        /// The round the decision was reached in.
        round: u64,
    },
    /// The process was stopped before deciding.
    Stopped,
    /// The process had already decided when the run was requested.
    AlreadySettled,
    /// A run was already in progress; this request did nothing.
    AlreadyRunning,
    /// The process is faulty and performs no protocol work.
    Faulty,
}

// ── Framing ─────────────────────────────────────────────────────────────────

/// Read the length prefix from a 4-byte frame header.
pub fn read_frame_len(header: &[u8; 4]) -> usize {
    u32::from_le_bytes(*header) as usize
}

fn encode_framed<T: Serialize>(value: &T, max_size: usize) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    if payload.len() > max_size {
        return Err(NetError::MessageTooLarge {
            size: payload.len(),
            max: max_size,
        });
    }
    let len = payload.len() as u32;
    let mut buf = Vec::with_capacity(4usize.saturating_add(payload.len()));
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

impl Request {
    /// Deserialize a request from a frame payload.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(NetError::Serialization)
    }

    /// Serialize with a 4-byte little-endian length prefix.
    pub fn serialize_framed(&self, max_size: usize) -> Result<Vec<u8>> {
        encode_framed(self, max_size)
    }

    /// Return a human-readable tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Deliver(_) => "deliver",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::GetState => "get_state",
        }
    }
}

impl Response {
    /// Deserialize a response from a frame payload.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(NetError::Serialization)
    }

    /// Serialize with a 4-byte little-endian length prefix.
    pub fn serialize_framed(&self, max_size: usize) -> Result<Vec<u8>> {
        encode_framed(self, max_size)
    }

    /// Return a human-readable tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Probe(_) => "probe",
            Self::Deliver(_) => "deliver",
            Self::Start(_) => "start",
            Self::Stop => "stop",
            Self::State(_) => "state",
            Self::Error(_) => "error",
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
