//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table for the enabled services
//! - Start the signaling listener concurrently with route registration
//! - Bind the SBI listener (fatal on failure) and start serving
//! - Register with the NRF (best effort)
//! - Install the termination-signal handler
//!
//! # Design Decisions
//! - Only the SBI listener setup can fail startup
//! - The registry and signaling sides degrade to log lines

use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::NfConfig;
use crate::http::server::{build_router, AppState, SbiServer, ServerError};
use crate::lifecycle::shutdown::{Shutdown, ShutdownSequence};
use crate::lifecycle::signals;
use crate::lifecycle::state::{LifecycleState, StateCell, StateError};
use crate::registry::{build_profile, NfInstanceId, Registry, RegistryError};
use crate::routing::RouteError;
use crate::services::{
    build_route_table, enabled_services, LoggingStatusNotifier, OperationHandler, StatusChangeNotifier,
    UnimplementedHandler,
};
use crate::signaling::{LoggingSignalingHandler, PeerRegistry, SignalingConfig, SignalingHandler, SignalingServer};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route table: {0}")]
    Routes(#[from] RouteError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Entry point for assembling an NF.
pub struct Nf;

impl Nf {
    pub fn builder(config: Arc<NfConfig>) -> NfBuilder {
        NfBuilder {
            config,
            handler: Arc::new(UnimplementedHandler),
            signaling: Arc::new(LoggingSignalingHandler),
            registry: None,
            notifier: Arc::new(LoggingStatusNotifier),
            handle_signals: true,
        }
    }
}

pub struct NfBuilder {
    config: Arc<NfConfig>,
    handler: Arc<dyn OperationHandler>,
    signaling: Arc<dyn SignalingHandler>,
    registry: Option<Arc<dyn Registry>>,
    notifier: Arc<dyn StatusChangeNotifier>,
    handle_signals: bool,
}

impl NfBuilder {
    pub fn handler(mut self, handler: Arc<dyn OperationHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn signaling(mut self, handler: Arc<dyn SignalingHandler>) -> Self {
        self.signaling = handler;
        self
    }

    /// Registry to register with at startup and deregister from on
    /// termination. `None` skips both.
    pub fn registry(mut self, registry: Option<Arc<dyn Registry>>) -> Self {
        self.registry = registry;
        self
    }

    /// Receiver of the `UNAVAILABLE` status change sent at the end of
    /// termination. Defaults to a logging notifier.
    pub fn status_notifier(mut self, notifier: Arc<dyn StatusChangeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Whether SIGINT/SIGTERM start the termination sequence. On by default.
    pub fn handle_signals(mut self, enabled: bool) -> Self {
        self.handle_signals = enabled;
        self
    }

    /// Run the `Starting` phase and return the serving NF.
    pub async fn start(self) -> Result<RunningNf, StartupError> {
        let config = self.config;
        let configuration = &config.configuration;
        let lifecycle = &config.lifecycle;

        let state = StateCell::new();
        state.advance(LifecycleState::Starting)?;
        tracing::info!(amf_name = %configuration.amf_name, "Starting AMF");

        let services = enabled_services(&configuration.service_name_list);
        let sbi_setup = async {
            let routes = Arc::new(build_route_table(&services)?);
            tracing::info!(
                services = ?services.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
                routes = routes.len(),
                "SBI routes registered"
            );
            let router = build_router(AppState {
                routes,
                handler: Arc::clone(&self.handler),
                max_body_size: configuration.sbi.max_body_size,
            });
            Ok::<_, StartupError>(SbiServer::bind(&configuration.sbi, router).await?)
        };

        let (signaling, sbi) = tokio::join!(
            SignalingServer::start(signaling_config(&config), Arc::clone(&self.signaling)),
            sbi_setup
        );
        let signaling = Arc::new(signaling);
        let sbi = match sbi {
            Ok(sbi) => sbi,
            Err(e) => {
                signaling.stop().await;
                return Err(e);
            }
        };

        let http_addr = sbi.local_addr();
        let http_shutdown = Shutdown::new();
        let http_task = tokio::spawn(sbi.run(
            http_shutdown.subscribe(),
            Duration::from_millis(lifecycle.http_shutdown_ms),
        ));

        let nf_id = Arc::new(NfInstanceId::generate());
        let registered = Arc::new(AtomicBool::new(false));
        if let Some(registry) = &self.registry {
            if register(&config, registry.as_ref(), &nf_id).await {
                registered.store(true, Ordering::SeqCst);
            }
        }

        let sequence = Arc::new(ShutdownSequence::new(
            Arc::clone(&config),
            state.clone(),
            Arc::clone(&signaling),
            self.registry.clone(),
            Arc::clone(&nf_id),
            registered,
            Arc::clone(&self.notifier),
            http_shutdown,
        ));

        let signal_task = self.handle_signals.then(|| {
            let sequence = Arc::clone(&sequence);
            tokio::spawn(async move {
                signals::wait_for_termination().await;
                sequence.run().await;
            })
        });

        state.advance(LifecycleState::Serving)?;
        tracing::info!(
            sbi = %http_addr,
            signaling = ?signaling.local_addrs(),
            nf_instance_id = %nf_id.current(),
            "AMF serving"
        );

        Ok(RunningNf {
            state,
            http_addr,
            signaling,
            nf_id,
            sequence,
            http_task,
            signal_task,
        })
    }
}

fn signaling_config(config: &NfConfig) -> SignalingConfig {
    let configuration = &config.configuration;
    let addrs = configuration
        .ngap_ip_list
        .iter()
        .filter_map(|ip| match ip.parse::<IpAddr>() {
            Ok(ip) => Some(SocketAddr::new(ip, configuration.ngap_port)),
            Err(_) => {
                tracing::warn!(address = %ip, "Skipping unparseable signaling address");
                None
            }
        })
        .collect();

    SignalingConfig {
        addrs,
        max_peers: configuration.ngap_max_peers,
        drain: Duration::from_millis(config.lifecycle.signaling_drain_ms),
    }
}

/// Build the profile and register it. Returns whether registration succeeded.
async fn register(config: &NfConfig, registry: &dyn Registry, nf_id: &NfInstanceId) -> bool {
    let requested = nf_id.current();
    let profile = match build_profile(config, &requested) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Cannot build NF profile, skipping NRF registration");
            return false;
        }
    };

    let timeout = Duration::from_millis(config.lifecycle.registry_timeout_ms);
    match tokio::time::timeout(timeout, registry.register(&requested, &profile)).await {
        Ok(Ok(assigned)) => {
            tracing::info!(nf_instance_id = %assigned, "Registered with NRF");
            nf_id.publish(assigned);
            true
        }
        Ok(Err(RegistryError::Rejected(problem))) => {
            tracing::warn!(
                status = problem.status.unwrap_or_default(),
                title = problem.title.as_deref().unwrap_or(""),
                cause = problem.cause.as_deref().unwrap_or(""),
                "NRF rejected registration"
            );
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "NRF registration failed");
            false
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "NRF registration timed out");
            false
        }
    }
}

/// A started NF.
pub struct RunningNf {
    state: StateCell,
    http_addr: SocketAddr,
    signaling: Arc<SignalingServer>,
    nf_id: Arc<NfInstanceId>,
    sequence: Arc<ShutdownSequence>,
    http_task: JoinHandle<Result<(), ServerError>>,
    signal_task: Option<JoinHandle<()>>,
}

impl RunningNf {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn signaling_addrs(&self) -> &[SocketAddr] {
        self.signaling.local_addrs()
    }

    /// The NRF-assigned id, or the placeholder if registration did not succeed.
    pub fn nf_id(&self) -> Arc<String> {
        self.nf_id.current()
    }

    pub fn state(&self) -> LifecycleState {
        self.state.current()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn peers(&self) -> &PeerRegistry {
        self.signaling.peers()
    }

    /// Run the termination sequence. Returns false if it already ran.
    pub async fn terminate(&self) -> bool {
        self.sequence.run().await
    }

    /// Wait for the SBI server to finish, then enter `Stopped`.
    ///
    /// An error means the server failed at runtime rather than through the
    /// termination sequence.
    pub async fn wait(self) -> Result<(), ServerError> {
        let result = match self.http_task.await {
            Ok(result) => result,
            Err(e) => Err(ServerError::Serve(std::io::Error::other(e))),
        };

        if let Some(signal_task) = self.signal_task {
            signal_task.abort();
        }

        if result.is_ok() {
            self.sequence.finished().await;
        }
        if let Err(e) = self.state.advance(LifecycleState::Stopped) {
            tracing::debug!(error = %e, "Stop transition skipped");
        }
        result
    }
}
