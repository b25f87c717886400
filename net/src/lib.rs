//! Benor Networking Layer
//!
//! Point-to-point plumbing for the benor consensus cluster. Every
//! inter-process interaction — liveness probes, vote delivery, protocol
//! start/stop, state queries — is one framed request answered by one framed
//! response over TCP:
//!
//! ```text
//! [4 bytes: payload length (u32-le)] [N bytes: bincode payload]
//! ```
//!
//! The transport knows nothing about the protocol: it decodes frames and
//! dispatches them into the [`transport::NodeApi`] trait, which the process
//! runtime implements. Broadcasts fan out concurrently with per-peer
//! failure isolation — an unreachable peer costs one warning, never a
//! round.
//!
//! ## Crate modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`]    | `NetConfig` defaults and dev overrides |
//! | [`message`]   | Wire types, bincode ser/de, framing helpers |
//! | [`peers`]     | Static id → address directory, broadcast target lists |
//! | [`transport`] | TCP listener, send/broadcast helpers, `NodeApi` seam |
//! | [`error`]     | Crate-wide error enum |

pub mod config;
pub mod error;
pub mod message;
pub mod peers;
pub mod transport;

pub use {
    config::NetConfig,
    error::{NetError, Result},
    message::{ProbeStatus, Request, Response, StartOutcome},
    peers::PeerDirectory,
    transport::{broadcast_vote, deliver_vote, send_request, NodeApi, TransportListener},
};
