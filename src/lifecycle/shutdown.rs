//! Shutdown coordination and the ordered termination sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::NfConfig;
use crate::lifecycle::state::{LifecycleState, StateCell};
use crate::models::Guami;
use crate::registry::{NfInstanceId, Registry, RegistryError};
use crate::services::{AmfStatus, StatusChangeNotifier};
use crate::signaling::SignalingServer;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe
/// to. Triggering is one-shot.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Returns false if it was already triggered.
    pub fn trigger(&self) -> bool {
        let first = self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            let _ = self.tx.send(());
        }
        first
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once triggered, including when that already happened.
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Number of active subscribers (tasks still listening).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// The termination steps, run at most once:
///
/// 1. notify every tracked peer that this NF is unavailable
/// 2. stop the signaling listener
/// 3. deregister from the registry
/// 4. send the `UNAVAILABLE` status change for the served GUAMIs
/// 5. log completion and release the SBI server
///
/// Failures in 1-4 are logged and never stop the sequence.
pub struct ShutdownSequence {
    config: Arc<NfConfig>,
    state: StateCell,
    signaling: Arc<SignalingServer>,
    registry: Option<Arc<dyn Registry>>,
    nf_id: Arc<NfInstanceId>,
    registered: Arc<AtomicBool>,
    notifier: Arc<dyn StatusChangeNotifier>,
    http: Shutdown,
    started: AtomicBool,
    finished: Shutdown,
}

impl ShutdownSequence {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<NfConfig>,
        state: StateCell,
        signaling: Arc<SignalingServer>,
        registry: Option<Arc<dyn Registry>>,
        nf_id: Arc<NfInstanceId>,
        registered: Arc<AtomicBool>,
        notifier: Arc<dyn StatusChangeNotifier>,
        http: Shutdown,
    ) -> Self {
        Self {
            config,
            state,
            signaling,
            registry,
            nf_id,
            registered,
            notifier,
            http,
            started: AtomicBool::new(false),
            finished: Shutdown::new(),
        }
    }

    /// Run the sequence. A second call returns false immediately.
    pub async fn run(&self) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Termination already in progress");
            return false;
        }

        if let Err(e) = self.state.advance(LifecycleState::Terminating) {
            tracing::warn!(error = %e, "Terminating from unexpected state");
        }
        tracing::info!("Terminating AMF");

        let lifecycle = &self.config.lifecycle;
        let guamis = &self.config.configuration.served_guami_list;

        self.signaling
            .notify_unavailable(guamis, Duration::from_millis(lifecycle.peer_notify_timeout_ms))
            .await;

        self.signaling.stop().await;

        self.deregister(Duration::from_millis(lifecycle.registry_timeout_ms)).await;

        self.notify_status(guamis, Duration::from_millis(lifecycle.peer_notify_timeout_ms))
            .await;

        tracing::info!("AMF terminated");
        self.http.trigger();
        self.finished.trigger();
        true
    }

    /// Resolve when a run has completed all steps.
    pub async fn finished(&self) {
        self.finished.wait().await
    }

    async fn deregister(&self, timeout: Duration) {
        let Some(registry) = &self.registry else {
            return;
        };
        if !self.registered.load(Ordering::SeqCst) {
            tracing::info!("Not registered with NRF, skipping deregistration");
            return;
        }

        let nf_id = self.nf_id.current();
        match tokio::time::timeout(timeout, registry.deregister(&nf_id)).await {
            Ok(Ok(())) => tracing::info!(nf_instance_id = %nf_id, "Deregistered from NRF"),
            Ok(Err(RegistryError::Rejected(problem))) => tracing::warn!(
                nf_instance_id = %nf_id,
                status = problem.status.unwrap_or_default(),
                title = problem.title.as_deref().unwrap_or(""),
                cause = problem.cause.as_deref().unwrap_or(""),
                "NRF rejected deregistration"
            ),
            Ok(Err(e)) => tracing::warn!(nf_instance_id = %nf_id, error = %e, "Deregistration failed"),
            Err(_) => tracing::warn!(
                nf_instance_id = %nf_id,
                timeout_ms = timeout.as_millis() as u64,
                "Deregistration timed out"
            ),
        }
    }

    async fn notify_status(&self, guamis: &[Guami], timeout: Duration) {
        let status = AmfStatus::Unavailable;
        match tokio::time::timeout(timeout, self.notifier.notify(status, guamis)).await {
            Ok(Ok(())) => tracing::debug!(status = %status, guamis = guamis.len(), "Status change sent"),
            Ok(Err(e)) => tracing::warn!(status = %status, error = %e, "Status change notification failed"),
            Err(_) => tracing::warn!(
                status = %status,
                timeout_ms = timeout.as_millis() as u64,
                "Status change notification timed out"
            ),
        }
    }
}
