//! Configuration for the benor networking layer.

use std::net::SocketAddr;

/// Configuration for a process's point-to-point transport.
///
/// Controls where the listener binds, how large a single frame may be, and
/// how long outbound connects are allowed to take.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Local address to bind the listener on.
    /// Default: `0.0.0.0:7400`
    pub bind_addr: SocketAddr,

    /// Maximum size of a single serialized message in bytes.
    /// Votes and control messages are tiny; 64 KiB leaves generous room.
    pub max_message_size: usize,

    /// How long to wait for an outbound TCP connect before giving up (ms).
    pub connect_timeout_ms: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:7400".parse().expect("valid default bind addr"),
            max_message_size: 65_536,
            connect_timeout_ms: 1_000,
        }
    }
}

impl NetConfig {
    /// Create a config suitable for local testing: ephemeral port, short
    /// connect timeout.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn dev_default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".parse().expect("valid dev bind addr"),
            max_message_size: 65_536,
            connect_timeout_ms: 500,
        }
    }
}
