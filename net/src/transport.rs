//! TCP transport for inter-process requests.
//!
//! Every exchange is one framed [`Request`] answered by one framed
//! [`Response`] on the same connection. A connection may carry any number
//! of exchanges in sequence.
//!
//! ## Wire format
//!
//! ```text
//! [4 bytes: payload length (u32-le)] [N bytes: bincode payload]
//! ```
//!
//! The listener reads the 4-byte header, validates the length against
//! `max_message_size`, reads exactly that many bytes, and dispatches the
//! decoded [`Request`] into the [`NodeApi`] handler. Oversized or
//! undecodable frames are connection-local failures: the connection is
//! dropped, nothing else is affected.

use {
    crate::{
        config::NetConfig,
        error::{NetError, Result},
        message::{read_frame_len, Request, Response},
    },
    async_trait::async_trait,
    benor_consensus::{DeliveryOutcome, ProcessId, Vote},
    log::{debug, error, info, warn},
    std::{net::SocketAddr, sync::Arc, time::Duration},
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    },
};

/// The narrow interface between the transport and the process runtime.
///
/// The listener decodes frames and hands each request to this trait; the
/// implementation owns all protocol state and decides what to answer.
#[async_trait]
pub trait NodeApi: Send + Sync + 'static {
    /// Handle one inbound request. A `Start` request is expected to block
    /// until the protocol run reaches a terminal outcome.
    async fn handle_request(&self, request: Request) -> Response;
}

/// Handle returned by [`TransportListener::start`].
pub struct TransportHandle {
    /// The local address the listener is bound to (useful when port = 0).
    pub local_addr: SocketAddr,
}

/// Listens for inbound TCP connections and serves request/response
/// exchanges against a [`NodeApi`] handler.
pub struct TransportListener {
    config: NetConfig,
}

impl TransportListener {
    /// Create a new transport listener with the given config.
    pub fn new(config: NetConfig) -> Self {
        Self { config }
    }

    /// Bind and start accepting connections.
    ///
    /// Spawns a Tokio task per accepted connection; each task serves
    /// exchanges until the peer disconnects.
    pub async fn start<H: NodeApi>(self, handler: Arc<H>) -> Result<TransportHandle> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("transport listening on {}", local_addr);

        let max_msg = self.config.max_message_size;

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("accepted connection from {}", addr);
                        let handler = Arc::clone(&handler);
                        tokio::spawn(Self::handle_connection(stream, addr, handler, max_msg));
                    }
                    Err(e) => {
                        error!("accept error: {}", e);
                    }
                }
            }
        });

        Ok(TransportHandle { local_addr })
    }

    /// Serve request/response exchanges on `stream` until EOF or error.
    async fn handle_connection<H: NodeApi>(
        mut stream: TcpStream,
        addr: SocketAddr,
        handler: Arc<H>,
        max_message_size: usize,
    ) {
        let mut header_buf = [0u8; 4];

        loop {
            // 1. Read the 4-byte length prefix.
            if let Err(e) = stream.read_exact(&mut header_buf).await {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    warn!("header read error from {}: {}", addr, e);
                }
                break;
            }

            let len = read_frame_len(&header_buf);
            if len > max_message_size {
                warn!(
                    "peer {} sent oversized frame ({} > {}), dropping connection",
                    addr, len, max_message_size
                );
                break;
            }

            // 2. Read the payload.
            let mut payload = vec![0u8; len];
            if let Err(e) = stream.read_exact(&mut payload).await {
                warn!("payload read error from {}: {}", addr, e);
                break;
            }

            // 3. Decode, dispatch, answer. A request we cannot decode is a
            //    request we cannot answer, so the connection is dropped.
            let request = match Request::deserialize(&payload) {
                Ok(request) => request,
                Err(e) => {
                    warn!("deserialization error from {}: {}", addr, e);
                    break;
                }
            };
            debug!("received {} from {}", request.kind(), addr);

            let response = handler.handle_request(request).await;
            let frame = match response.serialize_framed(max_message_size) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("failed to encode {} response: {}", response.kind(), e);
                    break;
                }
            };
            if let Err(e) = stream.write_all(&frame).await {
                warn!("response write error to {}: {}", addr, e);
                break;
            }
        }

        debug!("connection to {} closed", addr);
    }
}

// ── Outbound sending ────────────────────────────────────────────────────────

/// Send one request to `addr` over a new TCP connection and await the
/// response.
///
/// Only the connect is bounded by a timeout: a `Start` request legitimately
/// blocks until the remote process settles, so the response read waits as
/// long as the connection stays open.
pub async fn send_request(addr: SocketAddr, request: &Request, config: &NetConfig) -> Result<Response> {
    let frame = request.serialize_framed(config.max_message_size)?;

    let connect = TcpStream::connect(addr);
    let mut stream =
        match tokio::time::timeout(Duration::from_millis(config.connect_timeout_ms), connect).await
        {
            Ok(connected) => connected?,
            Err(_) => {
                return Err(NetError::ConnectTimeout {
                    addr,
                    timeout_ms: config.connect_timeout_ms,
                })
            }
        };

    stream.write_all(&frame).await?;
    stream.flush().await?;

    let mut header_buf = [0u8; 4];
    if let Err(e) = stream.read_exact(&mut header_buf).await {
        return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
            NetError::ConnectionClosed
        } else {
            NetError::Transport(e)
        });
    }
    let len = read_frame_len(&header_buf);
    if len > config.max_message_size {
        return Err(NetError::MessageTooLarge {
            size: len,
            max: config.max_message_size,
        });
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Response::deserialize(&payload)
}

/// Deliver one vote to a peer, returning the receiver's typed outcome.
///
/// Rejections (`InvalidRound`, `AlreadySettled`) are part of the success
/// path; only transport failures are errors.
pub async fn deliver_vote(addr: SocketAddr, vote: Vote, config: &NetConfig) -> Result<DeliveryOutcome> {
    match send_request(addr, &Request::Deliver(vote), config).await? {
        Response::Deliver(outcome) => Ok(outcome),
        other => Err(NetError::UnexpectedResponse(other.kind())),
    }
}

/// Broadcast a vote to multiple peers concurrently.
///
/// Each peer send is independently fallible; a failed or unreachable peer
/// never aborts the rest of the fan-out. Returns the list of peers where
/// delivery failed at the transport level.
pub async fn broadcast_vote(
    peers: &[(ProcessId, SocketAddr)],
    vote: Vote,
    config: &NetConfig,
) -> Vec<(ProcessId, NetError)> {
    let mut handles = Vec::with_capacity(peers.len());
    for &(id, addr) in peers {
        let config = config.clone();
        handles.push(tokio::spawn(async move {
            (id, deliver_vote(addr, vote, &config).await)
        }));
    }

    let mut failures = Vec::new();
    for handle in handles {
        if let Ok((id, result)) = handle.await {
            match result {
                Ok(outcome) => debug!("peer {} answered {}", id, outcome.kind()),
                Err(e) => failures.push((id, e)),
            }
        }
    }
    failures
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use {
        super::*,
        benor_consensus::{BinaryValue, StateSnapshot},
        crate::message::ProbeStatus,
    };

    /// Canned handler: healthy, accepts every vote, snapshot of a fresh
    /// correct process.
    struct CannedApi;

    #[async_trait]
    impl NodeApi for CannedApi {
        async fn handle_request(&self, request: Request) -> Response {
            match request {
                Request::Probe => Response::Probe(ProbeStatus::Healthy),
                Request::Deliver(_) => Response::Deliver(DeliveryOutcome::Accepted),
                Request::Start => Response::Start(crate::message::StartOutcome::Stopped),
                Request::Stop => Response::Stop,
                Request::GetState => Response::State(StateSnapshot {
                    stopped: false,
                    value: Some(BinaryValue::Zero),
                    decided: Some(false),
                    round: Some(0),
                }),
            }
        }
    }

    async fn start_canned_listener() -> (SocketAddr, NetConfig) {
        let config = NetConfig::dev_default();
        let listener = TransportListener::new(config.clone());
        let handle = listener.start(Arc::new(CannedApi)).await.unwrap();
        (handle.local_addr, config)
    }

    #[tokio::test]
    async fn test_request_response_exchange() {
        let (addr, config) = start_canned_listener().await;
        let response = send_request(addr, &Request::Probe, &config).await.unwrap();
        assert_eq!(response, Response::Probe(ProbeStatus::Healthy));
    }

    #[tokio::test]
    async fn test_deliver_vote_returns_outcome() {
        let (addr, config) = start_canned_listener().await;
        let outcome = deliver_vote(addr, Vote::new(BinaryValue::One, 0), &config)
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Accepted);
    }

    #[tokio::test]
    async fn test_multiple_exchanges_reuse_nothing() {
        // Two sequential one-shot sends each open their own connection.
        let (addr, config) = start_canned_listener().await;
        for _ in 0..3 {
            let response = send_request(addr, &Request::GetState, &config).await.unwrap();
            assert!(matches!(response, Response::State(_)));
        }
    }

    #[tokio::test]
    async fn test_broadcast_isolates_dead_peer() {
        let (addr, config) = start_canned_listener().await;
        // Port 1 on localhost refuses connections.
        let dead: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let failures = broadcast_vote(
            &[(0, addr), (1, dead)],
            Vote::new(BinaryValue::Zero, 0),
            &config,
        )
        .await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, 1);
    }

    #[tokio::test]
    async fn test_send_to_unreachable_peer_fails() {
        let config = NetConfig::dev_default();
        let dead: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let result = send_request(dead, &Request::Probe, &config).await;
        assert!(result.is_err());
    }
}
