//! The seam between the signaling listener and the protocol logic.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::models::Guami;
use crate::net::connection::ConnectionId;
use crate::signaling::peer::PeerNode;

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("signaling I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("peer {0} is no longer connected")]
    PeerGone(ConnectionId),
    #[error("peer rejected the message: {0}")]
    Rejected(String),
}

/// Signaling protocol logic (framing, message encoding, state machine).
#[async_trait]
pub trait SignalingHandler: Send + Sync + 'static {
    /// Run one peer connection. Should return soon after `shutdown` fires.
    async fn serve(&self, peer: Arc<PeerNode>, stream: TcpStream, shutdown: broadcast::Receiver<()>);

    /// Tell `peer` this NF is going away, listing the GUAMIs it served.
    async fn notify_unavailable(&self, peer: &PeerNode, guamis: &[Guami]) -> Result<(), SignalingError>;

    /// Called once after the listener stopped and workers were drained.
    async fn on_listener_stopped(&self) {}
}

/// Handler used when no protocol stack is plugged in: reads and discards
/// peer traffic, logs notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSignalingHandler;

#[async_trait]
impl SignalingHandler for LoggingSignalingHandler {
    async fn serve(&self, peer: Arc<PeerNode>, mut stream: TcpStream, mut shutdown: broadcast::Receiver<()>) {
        let mut buf = vec![0u8; 4096];
        let mut received = 0usize;
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                read = stream.read(&mut buf) => match read {
                    Ok(0) => break,
                    Ok(n) => received += n,
                    Err(e) => {
                        tracing::debug!(peer = %peer.id, error = %e, "Peer read failed");
                        break;
                    }
                },
            }
        }
        tracing::debug!(peer = %peer.id, addr = %peer.addr, bytes = received, "Peer connection finished");
    }

    async fn notify_unavailable(&self, peer: &PeerNode, guamis: &[Guami]) -> Result<(), SignalingError> {
        tracing::info!(peer = %peer.id, addr = %peer.addr, guamis = guamis.len(), "AMF status unavailable");
        Ok(())
    }
}
