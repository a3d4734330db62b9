//! Signaling listener: accept loops, peer workers, notification fan-out, stop.

use futures_util::future::join_all;
use futures_util::FutureExt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::{JoinHandle, JoinSet};

use crate::lifecycle::shutdown::Shutdown;
use crate::models::Guami;
use crate::net::connection::ConnectionTracker;
use crate::net::listener::{ConnectionPermit, Listener, ListenerError};
use crate::observability::metrics;
use crate::signaling::handler::SignalingHandler;
use crate::signaling::peer::{PeerNode, PeerRegistry};

/// Listener settings.
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    pub addrs: Vec<SocketAddr>,
    pub max_peers: usize,
    /// How long workers may keep running after stop before being aborted.
    pub drain: Duration,
}

/// Outcome of an unavailability broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifySummary {
    pub delivered: usize,
    pub failed: usize,
    pub timed_out: usize,
}

struct Shared {
    handler: Arc<dyn SignalingHandler>,
    peers: PeerRegistry,
    tracker: ConnectionTracker,
    shutdown: Shutdown,
    workers: Mutex<JoinSet<()>>,
}

/// Running signaling listener.
pub struct SignalingServer {
    shared: Arc<Shared>,
    accept_loops: Mutex<Vec<JoinHandle<()>>>,
    local_addrs: Vec<SocketAddr>,
    drain: Duration,
    stopped: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SignalingServer {
    /// Bind every address and start one accept loop per bound address.
    ///
    /// Bind failures are logged and skipped; the server runs on whatever
    /// addresses could be bound (possibly none).
    pub async fn start(config: SignalingConfig, handler: Arc<dyn SignalingHandler>) -> Self {
        let shared = Arc::new(Shared {
            handler,
            peers: PeerRegistry::new(),
            tracker: ConnectionTracker::new(),
            shutdown: Shutdown::new(),
            workers: Mutex::new(JoinSet::new()),
        });

        let mut accept_loops = Vec::new();
        let mut local_addrs = Vec::new();
        for addr in &config.addrs {
            match Listener::bind(*addr, config.max_peers).await {
                Ok(listener) => {
                    if let Ok(local) = listener.local_addr() {
                        local_addrs.push(local);
                    }
                    let shutdown = shared.shutdown.subscribe();
                    accept_loops.push(tokio::spawn(accept_loop(listener, Arc::clone(&shared), shutdown)));
                }
                Err(e) => {
                    tracing::error!(address = %addr, error = %e, "Signaling listener failed to start");
                }
            }
        }

        tracing::info!(addresses = ?local_addrs, "Signaling listener started");
        Self {
            shared,
            accept_loops: Mutex::new(accept_loops),
            local_addrs,
            drain: config.drain,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    pub fn peers(&self) -> &PeerRegistry {
        &self.shared.peers
    }

    /// Send "status unavailable" to every peer in a snapshot of the peer
    /// set. Each notification is a single attempt bounded by `per_peer`.
    pub async fn notify_unavailable(&self, guamis: &[Guami], per_peer: Duration) -> NotifySummary {
        let peers = self.shared.peers.snapshot();
        let handler = &self.shared.handler;

        let results = join_all(peers.iter().map(|peer| async move {
            (peer, tokio::time::timeout(per_peer, handler.notify_unavailable(peer, guamis)).await)
        }))
        .await;

        let mut summary = NotifySummary::default();
        for (peer, result) in results {
            match result {
                Ok(Ok(())) => {
                    summary.delivered += 1;
                    metrics::record_peer_notification("delivered");
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    metrics::record_peer_notification("failed");
                    tracing::warn!(peer = %peer.id, addr = %peer.addr, error = %e, "Peer notification failed");
                }
                Err(_) => {
                    summary.timed_out += 1;
                    metrics::record_peer_notification("timeout");
                    tracing::warn!(peer = %peer.id, addr = %peer.addr, "Peer notification timed out");
                }
            }
        }

        tracing::info!(
            peers = peers.len(),
            delivered = summary.delivered,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "Peers notified of unavailability"
        );
        summary
    }

    /// Stop accepting, let workers finish within the drain window, abort the
    /// rest. Only the first call does anything.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shared.shutdown.trigger();
        let loops = std::mem::take(&mut *lock(&self.accept_loops));
        for accept_loop in loops {
            let _ = accept_loop.await;
        }

        let active = self.shared.tracker.active_count();
        tracing::info!(active_peers = active, drain_ms = self.drain.as_millis() as u64, "Signaling listener closed");

        let drained = self.shared.tracker.wait_idle(self.drain).await;
        let mut workers = std::mem::take(&mut *lock(&self.shared.workers));
        if !drained {
            tracing::warn!(
                remaining = self.shared.tracker.active_count(),
                "Drain window elapsed, aborting signaling workers"
            );
            workers.abort_all();
        }
        while workers.join_next().await.is_some() {}

        self.shared.handler.on_listener_stopped().await;
        tracing::info!("Signaling listener stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

async fn accept_loop(listener: Listener, shared: Arc<Shared>, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, addr, permit)) => {
                    if !admit(&shared, stream, addr, permit) {
                        break;
                    }
                }
                Err(ListenerError::Closed) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Signaling accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            },
        }
    }

    if let Ok(addr) = listener.local_addr() {
        tracing::debug!(address = %addr, "Signaling accept loop exited");
    }
}

/// Track an accepted peer and spawn its worker. Returns false, dropping the
/// connection, when shutdown has already been triggered.
fn admit(shared: &Shared, stream: TcpStream, addr: SocketAddr, permit: ConnectionPermit) -> bool {
    // Subscribe before checking: a trigger after this point reaches the worker.
    let worker_shutdown = shared.shutdown.subscribe();
    if shared.shutdown.is_triggered() {
        tracing::debug!(addr = %addr, "Signaling listener stopping, dropping new peer");
        return false;
    }

    let guard = shared.tracker.track();
    let peer = Arc::new(PeerNode::new(guard.id(), addr));
    let lease = shared.peers.lease(Arc::clone(&peer));
    let handler = Arc::clone(&shared.handler);

    tracing::info!(peer = %peer.id, addr = %addr, "Signaling peer connected");

    spawn_worker(shared, async move {
        let _permit = permit;
        let _guard = guard;
        let _lease = lease;
        handler.serve(peer, stream, worker_shutdown).await;
    });
    true
}

/// Reap finished workers, then spawn a new one into the set.
fn spawn_worker<F>(shared: &Shared, worker: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let mut workers = lock(&shared.workers);
    while let Some(Some(_)) = workers.join_next().now_or_never() {}
    workers.spawn(worker);
}
