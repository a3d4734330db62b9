//! Connected signaling peers.

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use crate::net::connection::ConnectionId;
use crate::observability::metrics;

/// A connected signaling peer (e.g. a RAN node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerNode {
    pub id: ConnectionId,
    pub addr: SocketAddr,
    pub connected_at: SystemTime,
}

impl PeerNode {
    pub fn new(id: ConnectionId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            connected_at: SystemTime::now(),
        }
    }
}

/// Concurrent set of connected peers.
///
/// Connection workers insert and remove entries; external handlers may
/// remove peers they consider gone. Readers work on snapshots.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<ConnectionId, Arc<PeerNode>>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `peer` until the returned lease is dropped.
    pub fn lease(&self, peer: Arc<PeerNode>) -> PeerLease {
        let id = peer.id;
        self.insert(peer);
        PeerLease {
            registry: self.clone(),
            id,
        }
    }

    pub fn insert(&self, peer: Arc<PeerNode>) {
        self.peers.insert(peer.id, peer);
        metrics::set_signaling_peers(self.peers.len());
    }

    pub fn remove(&self, id: ConnectionId) -> Option<Arc<PeerNode>> {
        let removed = self.peers.remove(&id).map(|(_, peer)| peer);
        metrics::set_signaling_peers(self.peers.len());
        removed
    }

    pub fn get(&self, id: ConnectionId) -> Option<Arc<PeerNode>> {
        self.peers.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Copy of the current peers, ordered by connection id.
    pub fn snapshot(&self) -> Vec<Arc<PeerNode>> {
        let mut peers: Vec<_> = self.peers.iter().map(|entry| Arc::clone(entry.value())).collect();
        peers.sort_by_key(|peer| peer.id);
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Removes its peer from the registry when dropped.
#[derive(Debug)]
pub struct PeerLease {
    registry: PeerRegistry,
    id: ConnectionId,
}

impl Drop for PeerLease {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
