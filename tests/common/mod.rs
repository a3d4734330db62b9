//! Shared utilities for integration testing.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use amf_service::config::NfConfig;
use amf_service::models::nrf::NfProfile;
use amf_service::models::{Guami, PlmnId, PlmnSupportItem, Snssai, Tai};
use amf_service::registry::{Registry, RegistryError};
use amf_service::services::{AmfStatus, NotifyError, StatusChangeNotifier};
use amf_service::signaling::{PeerNode, SignalingError, SignalingHandler};

/// Ordered record of externally visible events.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// How the mock NRF answers.
#[derive(Debug, Clone)]
pub struct NrfBehavior {
    pub status: u16,
    pub location: Option<String>,
    pub body: Option<serde_json::Value>,
    pub delay: Duration,
}

impl NrfBehavior {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            location: None,
            body: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockNrfState {
    behavior: NrfBehavior,
    calls: EventLog,
}

/// A running mock NRF. `calls` holds one `"METHOD /path"` entry per request.
pub struct MockNrf {
    pub addr: SocketAddr,
    pub calls: EventLog,
}

impl MockNrf {
    pub fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a mock NRF on an ephemeral port.
pub async fn start_mock_nrf(behavior: NrfBehavior) -> MockNrf {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = EventLog::default();
    let state = MockNrfState {
        behavior,
        calls: calls.clone(),
    };

    let app = Router::new().route("/{*path}", any(mock_nrf_handler)).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNrf { addr, calls }
}

async fn mock_nrf_handler(State(state): State<MockNrfState>, method: Method, uri: Uri, _body: Bytes) -> Response {
    state.calls.push(format!("{} {}", method, uri.path()));
    tokio::time::sleep(state.behavior.delay).await;

    let status = StatusCode::from_u16(state.behavior.status).unwrap();
    let mut response = match &state.behavior.body {
        Some(body) => (status, axum::Json(body.clone())).into_response(),
        None => status.into_response(),
    };
    if let Some(location) = &state.behavior.location {
        response
            .headers_mut()
            .insert(header::LOCATION, location.parse().unwrap());
    }
    response
}

fn plmn() -> PlmnId {
    PlmnId::new("208", "93")
}

/// A config that binds everything to ephemeral loopback ports.
pub fn test_config(nrf_uri: &str) -> NfConfig {
    let mut config = NfConfig::default();
    let configuration = &mut config.configuration;
    configuration.amf_name = "AMF-TEST".to_string();
    configuration.ngap_ip_list = vec!["127.0.0.1".to_string()];
    configuration.ngap_port = 0;
    configuration.sbi.binding_ipv4 = "127.0.0.1".to_string();
    configuration.sbi.register_ipv4 = Some("127.0.0.1".to_string());
    configuration.sbi.port = 0;
    configuration.service_name_list = vec!["namf-comm".to_string(), "namf-evts".to_string()];
    configuration.served_guami_list = vec![Guami {
        plmn_id: plmn(),
        amf_id: "cafe00".to_string(),
    }];
    configuration.support_tai_list = vec![Tai {
        plmn_id: plmn(),
        tac: "1".to_string(),
    }];
    configuration.plmn_support_list = vec![PlmnSupportItem {
        plmn_id: plmn(),
        snssai_list: vec![Snssai {
            sst: 1,
            sd: Some("010203".to_string()),
        }],
    }];
    configuration.nrf_uri = nrf_uri.to_string();

    config.lifecycle.registry_timeout_ms = 500;
    config.lifecycle.peer_notify_timeout_ms = 300;
    config.lifecycle.signaling_drain_ms = 300;
    config.lifecycle.http_shutdown_ms = 300;
    config
}

/// Registry double that records calls into an [`EventLog`]. Calls are
/// logged on entry, before any configured delay.
pub struct RecordingRegistry {
    pub log: EventLog,
    pub assigned_id: String,
    pub fail_deregister: bool,
    pub deregister_delay: Duration,
}

impl RecordingRegistry {
    pub fn new(log: EventLog, assigned_id: &str) -> Self {
        Self {
            log,
            assigned_id: assigned_id.to_string(),
            fail_deregister: false,
            deregister_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl Registry for RecordingRegistry {
    async fn register(&self, _nf_id: &str, profile: &NfProfile) -> Result<String, RegistryError> {
        self.log.push(format!("register {}", profile.nf_type));
        Ok(self.assigned_id.clone())
    }

    async fn deregister(&self, nf_id: &str) -> Result<(), RegistryError> {
        self.log.push(format!("deregister {}", nf_id));
        tokio::time::sleep(self.deregister_delay).await;
        if self.fail_deregister {
            return Err(RegistryError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Signaling double: holds connections open until shutdown and records
/// notifications and the listener stop.
///
/// The first `slow_peers` notifications take `notify_delay` to answer.
pub struct RecordingSignaling {
    pub log: EventLog,
    pub fail_notifications: bool,
    pub slow_peers: usize,
    pub notify_delay: Duration,
    notified: AtomicUsize,
}

impl RecordingSignaling {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_notifications: false,
            slow_peers: 0,
            notify_delay: Duration::ZERO,
            notified: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SignalingHandler for RecordingSignaling {
    async fn serve(&self, _peer: Arc<PeerNode>, mut stream: TcpStream, mut shutdown: broadcast::Receiver<()>) {
        let mut buf = [0u8; 512];
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                read = stream.read(&mut buf) => match read {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                },
            }
        }
    }

    async fn notify_unavailable(&self, _peer: &PeerNode, guamis: &[Guami]) -> Result<(), SignalingError> {
        self.log.push(format!("notify {}", guamis.len()));
        if self.notified.fetch_add(1, Ordering::SeqCst) < self.slow_peers {
            tokio::time::sleep(self.notify_delay).await;
        }
        if self.fail_notifications {
            return Err(SignalingError::Rejected("peer closed".to_string()));
        }
        Ok(())
    }

    async fn on_listener_stopped(&self) {
        self.log.push("listener stopped");
    }
}

/// Status notifier double that records each status change.
pub struct RecordingStatusNotifier {
    pub log: EventLog,
    pub fail: bool,
}

impl RecordingStatusNotifier {
    pub fn new(log: EventLog) -> Self {
        Self { log, fail: false }
    }
}

#[async_trait]
impl StatusChangeNotifier for RecordingStatusNotifier {
    async fn notify(&self, status: AmfStatus, guamis: &[Guami]) -> Result<(), NotifyError> {
        self.log.push(format!("status {} {}", status, guamis.len()));
        if self.fail {
            return Err(NotifyError::Transport("subscriber unreachable".to_string()));
        }
        Ok(())
    }
}

/// Poll `check` until it holds or `timeout` elapses.
pub async fn eventually<F: Fn() -> bool>(timeout: Duration, check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
