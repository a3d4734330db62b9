//! Configuration schema definitions.
//!
//! This module defines the complete deployment configuration of the NF.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Guami, NetworkName, PlmnSupportItem, Tai};

/// Root configuration for the NF.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NfConfig {
    /// Document metadata.
    pub info: InfoConfig,

    /// Network bindings and served identity.
    pub configuration: Configuration,

    /// Shutdown and registry timing.
    pub lifecycle: LifecycleConfig,

    /// Log level.
    pub logger: LoggerConfig,

    /// Prometheus exporter settings.
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InfoConfig {
    pub version: String,
    pub description: String,
}

/// The `configuration` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub amf_name: String,

    /// Addresses the signaling listener binds to.
    pub ngap_ip_list: Vec<String>,

    /// Port shared by every signaling bind address.
    pub ngap_port: u16,

    /// Upper bound on concurrently served signaling peers.
    pub ngap_max_peers: usize,

    pub sbi: SbiConfig,

    /// Enabled service names (`namf-comm`, `namf-evts`, ...).
    pub service_name_list: Vec<String>,

    pub served_guami_list: Vec<Guami>,
    pub support_tai_list: Vec<Tai>,
    pub plmn_support_list: Vec<PlmnSupportItem>,
    pub support_dnn_list: Vec<String>,

    /// Base URI of the NF repository function.
    pub nrf_uri: String,

    pub security: SecurityConfig,
    pub network_name: NetworkName,

    /// NAS timers in seconds.
    pub t3502: u32,
    pub t3512: u32,
    #[serde(alias = "mon3gppDeregistrationTimer")]
    pub non3gpp_deregistration_timer: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            amf_name: "AMF".to_string(),
            ngap_ip_list: vec!["127.0.0.1".to_string()],
            ngap_port: 38412,
            ngap_max_peers: 1024,
            sbi: SbiConfig::default(),
            service_name_list: Vec::new(),
            served_guami_list: Vec::new(),
            support_tai_list: Vec::new(),
            plmn_support_list: Vec::new(),
            support_dnn_list: Vec::new(),
            nrf_uri: "http://127.0.0.1:29510".to_string(),
            security: SecurityConfig::default(),
            network_name: NetworkName::default(),
            t3502: 720,
            t3512: 3600,
            non3gpp_deregistration_timer: 3240,
        }
    }
}

/// Service-based interface listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbiConfig {
    /// `http` or `https`.
    pub scheme: String,

    /// Address advertised to the NRF. Registration is skipped without it.
    #[serde(rename = "registerIPv4")]
    pub register_ipv4: Option<String>,

    /// Address the HTTP server binds to.
    #[serde(rename = "bindingIPv4")]
    pub binding_ipv4: String,

    pub port: u16,

    /// Certificate and key used when the scheme is `https`.
    pub tls: Option<TlsConfig>,

    /// Request bodies above this size are rejected.
    pub max_body_size: usize,
}

impl SbiConfig {
    pub fn is_tls(&self) -> bool {
        self.scheme == "https"
    }
}

impl Default for SbiConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            register_ipv4: None,
            binding_ipv4: "127.0.0.1".to_string(),
            port: 8000,
            tls: None,
            max_body_size: 1024 * 1024,
        }
    }
}

/// TLS material for the SBI listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub pem: String,

    /// Path to private key file (PEM).
    pub key: String,
}

/// NAS security algorithm preference lists, most preferred first.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub integrity_order: Vec<String>,
    pub ciphering_order: Vec<String>,
}

impl SecurityConfig {
    pub fn integrity_algorithms(&self) -> Result<Vec<IntegrityAlgorithm>, UnknownAlgorithm> {
        self.integrity_order.iter().map(|name| name.parse()).collect()
    }

    pub fn ciphering_algorithms(&self) -> Result<Vec<CipheringAlgorithm>, UnknownAlgorithm> {
        self.ciphering_order.iter().map(|name| name.parse()).collect()
    }
}

/// 5G NAS integrity algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityAlgorithm {
    Nia0,
    Nia1,
    Nia2,
    Nia3,
}

/// 5G NAS ciphering algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipheringAlgorithm {
    Nea0,
    Nea1,
    Nea2,
    Nea3,
}

/// An algorithm name outside NIA0..NIA3 / NEA0..NEA3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown security algorithm '{}'", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for IntegrityAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NIA0" => Ok(Self::Nia0),
            "NIA1" => Ok(Self::Nia1),
            "NIA2" => Ok(Self::Nia2),
            "NIA3" => Ok(Self::Nia3),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

impl FromStr for CipheringAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEA0" => Ok(Self::Nea0),
            "NEA1" => Ok(Self::Nea1),
            "NEA2" => Ok(Self::Nea2),
            "NEA3" => Ok(Self::Nea3),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Timing of the startup registration and the ordered shutdown.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecycleConfig {
    /// Bound on each registry call (register and deregister).
    pub registry_timeout_ms: u64,

    /// Bound on each peer "unavailable" notification.
    pub peer_notify_timeout_ms: u64,

    /// How long in-flight signaling workers may run after stop.
    pub signaling_drain_ms: u64,

    /// Grace period for in-flight HTTP requests after termination.
    pub http_shutdown_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            registry_timeout_ms: 3000,
            peer_notify_timeout_ms: 1000,
            signaling_drain_ms: 2000,
            http_shutdown_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Prometheus scrape address (e.g., "0.0.0.0:9090").
    pub bind_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "0.0.0.0:9090".to_string(),
        }
    }
}
