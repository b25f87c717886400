//! Static peer directory for a cluster.
//!
//! The cluster membership is fixed at construction; the directory only maps
//! process ids to socket addresses and answers "everyone but me" queries
//! for broadcasts. Liveness is not tracked here: a peer that is down simply
//! fails its individual send, which the broadcast path isolates per-peer.

use {
    crate::error::{NetError, Result},
    benor_consensus::ProcessId,
    std::{
        collections::BTreeMap,
        net::{IpAddr, SocketAddr},
    },
};

/// Map from process id to the address its listener is bound on.
#[derive(Debug, Clone)]
pub struct PeerDirectory {
    peers: BTreeMap<ProcessId, SocketAddr>,
}

impl PeerDirectory {
    /// Build a directory for the canonical deployment scheme: process `i`
    /// listens on `base_port + i` on a shared host.
    ///
    /// Every id must map to a distinct port; a range that would run past
    /// `u16::MAX` is rejected rather than aliasing ids onto one port.
    pub fn from_base_port(host: IpAddr, base_port: u16, cluster_size: u32) -> Result<Self> {
        if cluster_size > 0 {
            let last = cluster_size - 1;
            if u16::try_from(last)
                .ok()
                .and_then(|last| base_port.checked_add(last))
                .is_none()
            {
                return Err(NetError::PortRangeOverflow {
                    base_port,
                    cluster_size,
                });
            }
        }
        let peers = (0..cluster_size)
            .map(|id| (id, SocketAddr::new(host, base_port + id as u16)))
            .collect();
        Ok(Self { peers })
    }

    /// Build a directory from an explicit address list; process `i` gets
    /// the `i`-th address. Useful when listeners are bound on ephemeral
    /// ports.
    pub fn from_addrs(addrs: impl IntoIterator<Item = SocketAddr>) -> Self {
        let peers = addrs
            .into_iter()
            .enumerate()
            .map(|(id, addr)| (id as ProcessId, addr))
            .collect();
        Self { peers }
    }

    /// Address of the given process.
    pub fn addr_of(&self, id: ProcessId) -> Result<SocketAddr> {
        self.peers.get(&id).copied().ok_or(NetError::UnknownPeer(id))
    }

    /// Every `(id, addr)` pair except the given process. This is the
    /// broadcast target list: a process never sends to itself.
    pub fn peers_except(&self, id: ProcessId) -> Vec<(ProcessId, SocketAddr)> {
        self.peers
            .iter()
            .filter(|(peer_id, _)| **peer_id != id)
            .map(|(peer_id, addr)| (*peer_id, *addr))
            .collect()
    }

    /// Number of processes in the directory.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
