//! Error types for the benor networking layer.

use {benor_consensus::ProcessId, std::net::SocketAddr, thiserror::Error};

/// Errors that can occur in the networking layer.
///
/// These are transport-level failures only. Protocol-level rejections
/// (stale round, settled process) travel on the success path as typed
/// outcomes inside [`crate::message::Response`].
#[derive(Error, Debug)]
pub enum NetError {
    /// Failed to serialize or deserialize a message.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Message exceeds the maximum allowed size.
    #[error("message too large: {size} bytes (max {max} bytes)")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The peer is not known to the peer directory.
    #[error("unknown peer: {0}")]
    UnknownPeer(ProcessId),

    /// A sequential port assignment would run past the end of the valid
    /// port range.
    #[error("port range overflow: base port {base_port} with {cluster_size} processes exceeds port 65535")]
    PortRangeOverflow {
        /// First port of the range.
        base_port: u16,
        /// Number of sequential ports required.
        cluster_size: u32,
    },

    /// Transport-level I/O error.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Connecting to a peer took longer than the configured timeout.
    #[error("connect timeout to {addr} after {timeout_ms}ms")]
    ConnectTimeout {
        /// Address being connected to.
        addr: SocketAddr,
        /// Configured connect timeout.
        timeout_ms: u64,
    },

    /// The connection closed before a full response arrived.
    #[error("connection closed before a response arrived")]
    ConnectionClosed,

    /// The peer answered a request with a response of the wrong kind.
    #[error("unexpected response kind: {0}")]
    UnexpectedResponse(&'static str),
}

/// Convenience result type for networking operations.
pub type Result<T> = std::result::Result<T, NetError>;
